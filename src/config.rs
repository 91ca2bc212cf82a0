use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://librarium.db?mode=rwc".to_string()
            } else {
                format!("sqlite://librarium_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn profile_selects_database_file() {
        unsafe {
            env::remove_var("DATABASE_URL");
            env::set_var("PROFILE", "shelf2");
        }
        let config = Config::from_env();
        assert_eq!(config.profile, "shelf2");
        assert_eq!(config.database_url, "sqlite://librarium_shelf2.db?mode=rwc");
        unsafe {
            env::remove_var("PROFILE");
        }
    }

    #[test]
    #[serial]
    fn explicit_database_url_wins() {
        unsafe {
            env::set_var("DATABASE_URL", "sqlite::memory:");
        }
        let config = Config::from_env();
        assert_eq!(config.database_url, "sqlite::memory:");
        unsafe {
            env::remove_var("DATABASE_URL");
        }
    }
}
