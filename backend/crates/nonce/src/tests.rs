//! Scenario tests for the nonce crate

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;

    use crate::*;

    fn fixture() -> (
        Arc<ManualClock>,
        IssueNonceUseCase<ManualClock>,
        ValidateNonceUseCase<ManualClock>,
    ) {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let issuer = IssueNonceUseCase::new(Arc::clone(&clock));
        let validator = ValidateNonceUseCase::new(Arc::clone(&clock));
        (clock, issuer, validator)
    }

    #[test]
    fn test_login_form_lifecycle() {
        let key = CipherKey::generate();
        let (clock, issuer, validator) = fixture();
        let policy = NoncePolicy::new(3600, "_s", 3);
        let scope = NonceScope::new("login-form", 7, 0);

        let nonce = issuer.execute(&scope, &policy, &key).unwrap();

        assert!(validator.execute(nonce.as_str(), &scope, &policy, &key));
        assert!(!validator.execute(
            nonce.as_str(),
            &NonceScope::new("login-form", 7, 1),
            &policy,
            &key
        ));

        clock.advance(3601);
        assert!(!validator.execute(nonce.as_str(), &scope, &policy, &key));
    }

    #[test]
    fn test_negative_ttl() {
        let key = CipherKey::generate();
        let (_, issuer, validator) = fixture();
        let policy = NoncePolicy::new(-1, "_", 2);
        let scope = NonceScope::new("f", 1, 0);

        let nonce = issuer.execute(&scope, &policy, &key).unwrap();
        assert!(!validator.execute(nonce.as_str(), &scope, &policy, &key));
    }

    #[test]
    fn test_other_user_rejected() {
        let key = CipherKey::generate();
        let (_, issuer, validator) = fixture();
        let policy = NoncePolicy::new(3600, "_", 2);

        let nonce = issuer.execute(&NonceScope::new("f", 1, 0), &policy, &key).unwrap();
        assert!(!validator.execute(nonce.as_str(), &NonceScope::new("f", 2, 0), &policy, &key));
    }

    #[test]
    fn test_every_byte_flip_rejected() {
        let key = CipherKey::generate();
        let (_, issuer, validator) = fixture();
        let policy = NoncePolicy::new(3600, "_", 2);
        let scope = NonceScope::new("f", 1, 0);

        let nonce = issuer.execute(&scope, &policy, &key).unwrap();
        let bytes = platform::crypto::from_base64(nonce.as_str()).unwrap();

        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] ^= 0x80;
            let encoded = platform::crypto::to_base64(&tampered);
            assert!(!validator.execute(&encoded, &scope, &policy, &key), "byte {i}");
        }
    }

    #[test]
    fn test_ttl_ignored_on_validate() {
        let key = CipherKey::generate();
        let (clock, issuer, validator) = fixture();
        let scope = NonceScope::new("f", 1, 0);

        let nonce = issuer.execute(&scope, &NoncePolicy::new(10, "_", 2), &key).unwrap();
        clock.advance(5);
        assert!(validator.execute(nonce.as_str(), &scope, &NoncePolicy::new(1, "_", 2), &key));
    }

    #[test]
    fn test_wall_clock_entry_points() {
        let config = NonceConfig::development();
        let policy = config.form.policy();
        let scope = NonceScope::new("search", 0, 0);

        let nonce = issue(&scope, &policy, &config.cipher_key).unwrap();
        assert!(validate(nonce.as_str(), &scope, &policy, &config.cipher_key));
    }

    #[test]
    fn test_concurrent_issue_and_validate() {
        let key = Arc::new(CipherKey::generate());
        let (_, issuer, validator) = fixture();
        let policy = Arc::new(NoncePolicy::new(3600, "_", 3));

        let handles: Vec<_> = (0..8i64)
            .map(|user_id| {
                let key = Arc::clone(&key);
                let policy = Arc::clone(&policy);
                let issuer = issuer.clone();
                let validator = validator.clone();
                std::thread::spawn(move || {
                    for object_id in 0..25 {
                        let scope = NonceScope::new("thread", user_id, object_id);
                        let nonce = issuer.execute(&scope, &policy, &key).unwrap();
                        assert!(validator.execute(nonce.as_str(), &scope, &policy, &key));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

#[cfg(test)]
mod guard_tests {
    use std::sync::Arc;

    use crate::*;

    #[test]
    fn test_form_and_session_share_a_key() {
        let config = NonceConfig::development();
        let clock = Arc::new(ManualClock::new(0));
        let store = MemorySessionStore::new();
        let peer = "10.0.0.1".parse().ok();
        let ctx = RequestContext::from_transport(None, peer, Some("test-agent"));

        let sessions = SessionGuard::with_defaults(Arc::clone(&clock), &config.session);
        sessions.create(&store, &ctx, 11, &config.cipher_key).unwrap();
        let user_id = sessions.user_id(&store).unwrap();

        let form = FormGuard::with_defaults(Arc::clone(&clock), "edit-profile", &config.form)
            .for_user(user_id);
        let markup = form.render_nonce_field(&config.cipher_key).unwrap();
        let value = markup
            .split("value=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();

        let submission = ctx.clone().with_field(&config.form.nonce_key, value);
        assert!(sessions.is_valid(&store, &submission, user_id, &config.cipher_key));
        assert_eq!(
            form.check_submission(&submission, &config.cipher_key, &mut NoHooks),
            FormOutcome::Valid
        );

        // Session nonce is not accepted as a form nonce
        let session_nonce = store.get("__n").unwrap();
        let forged = ctx.with_field(&config.form.nonce_key, session_nonce);
        assert!(!form.is_valid(&forged, &config.cipher_key));
    }

    #[test]
    fn test_store_as_trait_object() {
        let key = CipherKey::generate();
        let store: Box<dyn SessionStore> = Box::new(MemorySessionStore::new());
        let guard = SessionGuard::new(Arc::new(ManualClock::new(0)));
        let ctx = RequestContext::new();

        guard.create(&*store, &ctx, 5, &key).unwrap();
        assert!(guard.is_valid(&*store, &ctx, 5, &key));
    }
}
