#[tokio::main]
async fn main() {
    ::env_logger::Builder::from_env(
        ::env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let result =
        ::portguard::run(::std::env::args_os(), &::portguard::WarpStarter)
            .await;

    if let Err(err) = result {
        if let Some(usage) = err.downcast_ref::<::clap::Error>() {
            usage.exit();
        }

        eprintln!("Error: {:#}", err);
        ::std::process::exit(1);
    }
}
