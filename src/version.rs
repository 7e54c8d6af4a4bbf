pub const VERSION: &str = env!("PORTGUARD_VERSION");
