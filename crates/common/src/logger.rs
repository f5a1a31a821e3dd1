use tracing_subscriber::EnvFilter;

pub fn setup_logger() {
    let filter = EnvFilter::new("debug")
        .add_directive("hyper_util=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("teloxide=warn".parse().unwrap());

    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_env_filter(filter)
        .init();
}
