use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;

#[derive(Debug)]
pub struct Cli {
    pub schema_path: String,
    pub events_path: Option<String>,
    pub lookup_url: Option<String>,
    pub lookup_file: Option<String>,
    pub timeout: Option<u64>,
    pub print_document: bool,
}

fn command() -> Command {
    Command::new("Formflow Runtime")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("schema")
                .help("Form schema file (YAML or JSON)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("events")
                .long("events")
                .short('e')
                .help("Scenario file with the user events to replay"),
        )
        .arg(
            Arg::new("lookup_url")
                .long("lookup-url")
                .help("Base URL of the lookup table endpoint"),
        )
        .arg(
            Arg::new("lookup_file")
                .long("lookup-file")
                .help("File holding the lookup tables by name")
                .conflicts_with("lookup_url"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .short('t')
                .help("Lookup request timeout in seconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("print_document")
                .long("print-document")
                .short('p')
                .help("Print the document after the scenario")
                .value_parser(clap::builder::BoolishValueParser::new())
                .action(ArgAction::SetTrue)
                .default_value("false"),
        )
}

impl Cli {
    pub fn load() -> Result<Cli, clap::Error> {
        Self::load_from(std::env::args_os())
    }

    pub fn load_from<I, T>(args: I) -> Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;

        let schema_path = matches
            .get_one::<String>("schema")
            .cloned()
            .unwrap_or_default();

        Ok(Cli {
            schema_path,
            events_path: matches.get_one::<String>("events").cloned(),
            lookup_url: matches.get_one::<String>("lookup_url").cloned(),
            lookup_file: matches.get_one::<String>("lookup_file").cloned(),
            timeout: matches.get_one::<u64>("timeout").copied(),
            print_document: *matches.get_one::<bool>("print_document").unwrap_or(&false),
        })
    }
}
