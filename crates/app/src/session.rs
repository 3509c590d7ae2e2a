use engine::{SessionProvider, UserId};

use crate::config::AppConfig;

/// Session backed by the configured user id and access token. The CLI has no
/// interactive login; signing out only forgets the identity for this run.
#[derive(Debug, Clone, Default)]
pub struct ConfigSession {
    user: Option<UserId>,
}

impl ConfigSession {
    pub fn from_config(config: &AppConfig) -> Self {
        let user_id = config.user_id.trim();
        let user = (!user_id.is_empty()).then(|| UserId::new(user_id));
        Self { user }
    }
}

impl SessionProvider for ConfigSession {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }

    fn sign_out(&mut self) {
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_id_means_no_session() {
        let config = AppConfig {
            user_id: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(ConfigSession::from_config(&config).current_user().is_none());
    }

    #[test]
    fn sign_out_forgets_user() {
        let config = AppConfig {
            user_id: "a1b2".to_string(),
            ..AppConfig::default()
        };
        let mut session = ConfigSession::from_config(&config);
        assert_eq!(session.current_user(), Some(UserId::new("a1b2")));
        session.sign_out();
        assert!(session.current_user().is_none());
    }
}
