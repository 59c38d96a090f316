use tracing::{error, info};

fn main() -> std::process::ExitCode {
    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to build tokio runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    rt.block_on(async {
        tokio::select! {
            res = server::run() => match res {
                Ok(()) => {
                    info!("admin frontend stopped normally");
                    std::process::ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(error = %e, "admin frontend failed");
                    std::process::ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down");
                std::process::ExitCode::SUCCESS
            }
        }
    })
}
