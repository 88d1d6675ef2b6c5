fn main() {
    println!("Run `cargo test -p flows` to execute the end-to-end account flow tests.");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use alcohol_credentials::{Credentials, PasswordContext};
    use alcohol_rbac::{FlatRbac, MemoryRbac};
    use alcohol_tokengen::{TokenConfig, TokenGenerator, now_unix};

    const SECRET: &[u8] = b"flows-server-secret";

    /// Cheap settings so the flows run quickly.
    fn generator() -> TokenGenerator {
        let config = TokenConfig::from_json(
            r#"{"scheme": {"type": "pbkdf2", "iterations": 10}, "encoding": "url_safe"}"#,
        )
        .unwrap();
        TokenGenerator::from_config(SECRET, &config).unwrap()
    }

    fn password_ctx() -> PasswordContext {
        PasswordContext::Pbkdf2Sha256 { rounds: 100 }
    }

    /// Accounts as a storage layer would keep them: serialized JSON.
    #[derive(Default)]
    struct Store {
        rows: HashMap<String, String>,
    }

    impl Store {
        fn save(&mut self, name: &str, creds: &Credentials) {
            self.rows
                .insert(name.to_string(), serde_json::to_string(creds).unwrap());
        }

        fn load(&self, name: &str) -> Credentials {
            serde_json::from_str(&self.rows[name]).unwrap()
        }
    }

    #[test]
    fn password_reset_flow() {
        let generator = generator();
        let ctx = password_ctx();
        let mut store = Store::default();

        let mut user = Credentials::new();
        user.set_password(&ctx, "initial").unwrap();
        store.save("alice", &user);

        // Reset requested: token goes out by email.
        let token = store
            .load("alice")
            .create_reset_password_token(&generator, Duration::from_secs(3600))
            .unwrap();

        // Link followed: the stored record is reloaded and the token checked.
        let mut user = store.load("alice");
        assert!(user.check_password_reset_token(&generator, &token));
        assert!(user.reset_password(&generator, &ctx, &token, "changed").unwrap());
        store.save("alice", &user);

        // Replaying the link does nothing.
        let mut user = store.load("alice");
        assert!(!user.check_password_reset_token(&generator, &token));
        assert!(!user.reset_password(&generator, &ctx, &token, "hijack").unwrap());
        assert!(user.verify_password(&ctx, "changed"));
        assert!(!user.verify_password(&ctx, "initial"));
    }

    #[test]
    fn reset_token_outlives_nothing() {
        let generator = generator();
        let ctx = password_ctx();

        let mut user = Credentials::new();
        user.set_password(&ctx, "pw").unwrap();
        let early = user
            .create_reset_password_token(&generator, Duration::from_secs(3600))
            .unwrap();
        let late = user
            .create_reset_password_token(&generator, Duration::from_secs(3600))
            .unwrap();
        assert_ne!(early, late);

        // One password change revokes every outstanding token.
        user.set_password(&ctx, "pw2").unwrap();
        assert!(!user.check_password_reset_token(&generator, &early));
        assert!(!user.check_password_reset_token(&generator, &late));

        // And a new token expires on schedule.
        let short = user
            .create_reset_password_token(&generator, Duration::from_secs(5))
            .unwrap();
        assert!(user.check_password_reset_token_at(&generator, &short, now_unix()));
        assert!(!user.check_password_reset_token_at(&generator, &short, now_unix() + 6));
    }

    #[test]
    fn email_change_flow() {
        let generator = generator();
        let mut store = Store::default();

        let mut user = Credentials::from_parts(None, Some("old@example.invalid".into()), None);
        user.request_email_change("new@example.invalid");
        store.save("bob", &user);

        let token = store
            .load("bob")
            .create_email_activation_token(&generator, Duration::from_secs(3600))
            .unwrap();

        let mut user = store.load("bob");
        assert_eq!(user.email(), Some("old@example.invalid"));
        assert!(user.activate_email(&generator, &token));
        store.save("bob", &user);

        let user = store.load("bob");
        assert_eq!(user.email(), Some("new@example.invalid"));
        assert_eq!(user.unverified_email(), None);
    }

    #[test]
    fn tokens_do_not_cross_purposes() {
        let generator = generator();
        let ctx = password_ctx();

        let mut user = Credentials::new();
        user.set_password(&ctx, "pw").unwrap();
        user.request_email_change("c@example.invalid");

        let reset = user
            .create_reset_password_token(&generator, Duration::from_secs(3600))
            .unwrap();
        let activation = user
            .create_email_activation_token(&generator, Duration::from_secs(3600))
            .unwrap();

        assert!(!user.check_password_reset_token(&generator, &activation));
        assert!(!user.clone().activate_email(&generator, &reset));
    }

    #[test]
    fn other_servers_cannot_mint_tokens() {
        let ctx = password_ctx();
        let mut user = Credentials::new();
        user.set_password(&ctx, "pw").unwrap();

        let config = TokenConfig::from_json(
            r#"{"scheme": {"type": "pbkdf2", "iterations": 10}, "encoding": "url_safe"}"#,
        )
        .unwrap();
        let attacker = TokenGenerator::from_config(b"guessed-secret".to_vec(), &config).unwrap();

        let forged = user
            .create_reset_password_token(&attacker, Duration::from_secs(3600))
            .unwrap();
        assert!(!user.check_password_reset_token(&generator(), &forged));
    }

    #[test]
    fn admin_permission_gates_resets() {
        let generator = generator();
        let ctx = password_ctx();

        let mut rbac = MemoryRbac::<&str, &str, &str>::new();
        rbac.permit("admin", "reset-any-password");
        rbac.assign("carol", "admin");
        rbac.assign("dave", "support");

        let mut target = Credentials::new();
        target.set_password(&ctx, "pw").unwrap();

        let issue = |actor: &'static str| {
            if rbac.allowed(&actor, &"reset-any-password") {
                Some(
                    target
                        .create_reset_password_token(&generator, Duration::from_secs(600))
                        .unwrap(),
                )
            } else {
                None
            }
        };

        let token = issue("carol").expect("admin may issue resets");
        assert!(target.check_password_reset_token(&generator, &token));
        assert!(issue("dave").is_none());
    }
}
