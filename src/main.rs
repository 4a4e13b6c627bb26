mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fd_install::install::runners::{report_failure, run_install};
use fd_install::{InstallError, InstallRequest, InstallerConfig};
use log::debug;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let rendered = e.to_string();
            let rendered = rendered.trim_end();
            report_failure(rendered.strip_prefix("error: ").unwrap_or(rendered));
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(real_main(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(format_args!("{e:#}"));
            let code = e.downcast_ref::<InstallError>().map_or(1, InstallError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

async fn real_main(args: cli::Args) -> Result<()> {
    let config = load_config(&args).context("Failed to load configuration")?;

    let install_path = std::path::absolute(&args.install_path).unwrap_or(args.install_path);
    let request = InstallRequest::new(args.install_type, args.version, install_path);
    debug!("{:?}", request);

    run_install(&request, config, args.sha256).await?;
    Ok(())
}

/// Defaults, then config file, then environment, then flags
fn load_config(args: &cli::Args) -> Result<InstallerConfig> {
    let mut config = InstallerConfig::load(args.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(mirror) = &args.mirror {
        config.download_base_url = mirror.clone();
    }
    Ok(config)
}
