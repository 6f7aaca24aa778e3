use formflow_runtime::log::init_tracing;
use formflow_runtime::settings::SettingsError;
use formflow_runtime::{FormflowRuntime, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match Settings::try_load() {
        Ok(settings) => settings,
        Err(SettingsError::Args(err)) => err.exit(),
    };

    init_tracing();

    log::debug!("Starting Formflow Runtime");

    let report = match FormflowRuntime::run_settings(&settings).await {
        Ok(report) => report,
        Err(err) => {
            log::error!("Runtime Error: {}", err);
            return Err(err.into());
        }
    };

    for line in report.json_lines() {
        println!("{}", line);
    }

    if settings.print_document {
        print!("{}", report.document_yaml()?);
    }

    Ok(())
}
