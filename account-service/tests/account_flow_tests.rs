mod common;

use account_service::account::errors::AccountError;
use account_service::account::errors::Field;
use account_service::account::errors::ValidationReason;
use account_service::account::models::AccountChanges;
use account_service::account::models::RegistrationForm;
use account_service::account::ports::AccountRepository;
use account_service::account::ports::AccountServicePort;
use common::TestApp;

fn form(name: &str, email: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: Some(password.to_string()),
    }
}

#[tokio::test]
async fn test_register_account() {
    let app = TestApp::new();

    let registration = app
        .service
        .register(form("Foo Bar", "foo@bar.com", "secret1"))
        .await
        .expect("Failed to register");

    let account = registration.account;
    assert_eq!(account.name.as_str(), "Foo Bar");
    assert_eq!(account.email.as_str(), "foo@bar.com");
    assert!(!account.activated);
    assert!(account.activated_at.is_none());
    assert!(account.remember_digest.is_none());

    let activation_digest = account
        .activation_digest
        .as_deref()
        .expect("activation digest should be set");
    assert!(activation_digest.starts_with("$argon2id$"));
    assert!(!activation_digest.contains(&registration.activation_token));

    let password_digest = account.password_digest.as_deref().unwrap();
    assert!(!password_digest.contains("secret1"));

    assert!(
        app.service
            .verify_activation(&account, &registration.activation_token)
            .await
    );
}

#[tokio::test]
async fn test_register_duplicate_email_in_other_case() {
    let app = TestApp::new();

    app.service
        .register(form("Foo Bar", "a@b.com", "secret1"))
        .await
        .expect("Failed to register");

    let result = app
        .service
        .register(form("Other", "A@B.COM", "secret2"))
        .await;

    match result {
        Err(AccountError::Validation(errors)) => {
            assert_eq!(
                errors.for_field(Field::Email),
                vec![&ValidationReason::NotUnique]
            );
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn test_register_reports_all_invalid_fields() {
    let app = TestApp::new();

    let result = app
        .service
        .register(form(&"a".repeat(51), "foo@invalid", "short"))
        .await;

    match result {
        Err(AccountError::Validation(errors)) => {
            assert!(errors.contains(
                Field::Name,
                &ValidationReason::TooLong {
                    max: 50,
                    actual: 51
                }
            ));
            assert!(errors.contains(Field::Email, &ValidationReason::InvalidFormat));
            assert!(errors.contains(
                Field::Password,
                &ValidationReason::TooShort { min: 6, actual: 5 }
            ));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_registrations_with_same_email() {
    let app = TestApp::new();

    let (first, second) = tokio::join!(
        app.service.register(form("First", "race@bar.com", "secret1")),
        app.service.register(form("Second", "RACE@bar.com", "secret2")),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(AccountError::Validation(_)) | Err(AccountError::Persistence(_))
    )));
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn test_unsuccessful_edit() {
    let app = TestApp::new();
    let account = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register")
        .account;

    let changes = AccountChanges {
        name: Some(String::new()),
        email: Some("foo@invalid".to_string()),
        password: Some("foo".to_string()),
        password_confirmation: Some("bar".to_string()),
    };

    let result = app.service.update_account(&account.id, changes).await;
    assert!(matches!(result, Err(AccountError::Validation(_))));

    let reloaded = app
        .service
        .get_account(&account.id)
        .await
        .expect("Failed to reload");
    assert_eq!(reloaded, account);
}

#[tokio::test]
async fn test_successful_edit_without_password() {
    let app = TestApp::new();
    let account = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register")
        .account;

    let changes = AccountChanges {
        name: Some("Foo Bar".to_string()),
        email: Some("foo@bar.com".to_string()),
        password: Some(String::new()),
        password_confirmation: Some(String::new()),
    };

    app.service
        .update_account(&account.id, changes)
        .await
        .expect("Failed to update");

    let reloaded = app
        .service
        .get_account(&account.id)
        .await
        .expect("Failed to reload");
    assert_eq!(reloaded.name.as_str(), "Foo Bar");
    assert_eq!(reloaded.email.as_str(), "foo@bar.com");
    assert_eq!(reloaded.password_digest, account.password_digest);

    let logged_in = app
        .service
        .log_in("foo@bar.com", "password")
        .await
        .expect("old password should still work");
    assert_eq!(logged_in.id, account.id);
}

#[tokio::test]
async fn test_password_change() {
    let app = TestApp::new();
    let account = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register")
        .account;

    let too_short = AccountChanges {
        password: Some("short".to_string()),
        ..Default::default()
    };
    let result = app.service.update_account(&account.id, too_short).await;
    match result {
        Err(AccountError::Validation(errors)) => {
            assert_eq!(
                errors.for_field(Field::Password),
                vec![&ValidationReason::TooShort { min: 6, actual: 5 }]
            );
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    let longer = AccountChanges {
        password: Some("longer1".to_string()),
        password_confirmation: Some("longer1".to_string()),
        ..Default::default()
    };
    let updated = app
        .service
        .update_account(&account.id, longer)
        .await
        .expect("Failed to update password");
    assert_ne!(updated.password_digest, account.password_digest);

    assert!(app
        .service
        .log_in("harsh@example.com", "longer1")
        .await
        .is_ok());
    assert!(matches!(
        app.service.log_in("harsh@example.com", "password").await,
        Err(AccountError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_remember_and_forget() {
    let app = TestApp::new();
    let mut account = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register")
        .account;

    assert!(!app.service.authenticated(&account, "").await);

    let token = app
        .service
        .remember(&mut account)
        .await
        .expect("Failed to remember");
    assert!(app.service.authenticated(&account, &token).await);

    let stored = app
        .repository
        .find_by_id(&account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.remember_digest, account.remember_digest);
    assert!(app.service.authenticated(&stored, &token).await);

    app.service
        .forget(&mut account)
        .await
        .expect("Failed to forget");
    assert!(!app.service.authenticated(&account, &token).await);

    let stored = app
        .repository
        .find_by_id(&account.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.remember_digest.is_none());

    app.service
        .forget(&mut account)
        .await
        .expect("forget should be a no-op");
}

#[tokio::test]
async fn test_activation() {
    let app = TestApp::new();
    let registration = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register");
    let activation_digest = registration.account.activation_digest.clone();

    let wrong = app
        .service
        .activate("harsh@example.com", "not-the-token")
        .await;
    assert!(matches!(wrong, Err(AccountError::InvalidActivation)));

    let activated = app
        .service
        .activate("HARSH@example.com", &registration.activation_token)
        .await
        .expect("Failed to activate");
    assert!(activated.activated);
    assert!(activated.activated_at.is_some());
    assert_eq!(activated.activation_digest, activation_digest);

    let again = app
        .service
        .activate("harsh@example.com", &registration.activation_token)
        .await;
    assert!(matches!(again, Err(AccountError::InvalidActivation)));

    let reloaded = app
        .service
        .get_account(&registration.account.id)
        .await
        .unwrap();
    assert!(reloaded.activated);
}

#[tokio::test]
async fn test_delete_account() {
    let app = TestApp::new();
    let account = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register")
        .account;

    app.service
        .delete_account(&account.id)
        .await
        .expect("Failed to delete");

    assert!(matches!(
        app.service.get_account(&account.id).await,
        Err(AccountError::NotFound(_))
    ));
    assert!(matches!(
        app.service.delete_account(&account.id).await,
        Err(AccountError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_forget_from_stale_copy_ends_session() {
    let app = TestApp::new();
    let mut account = app
        .service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register")
        .account;
    let mut stale = account.clone();

    let token = app
        .service
        .remember(&mut account)
        .await
        .expect("Failed to remember");
    assert!(stale.remember_digest.is_none());

    app.service
        .forget(&mut stale)
        .await
        .expect("Failed to forget");

    let stored = app
        .repository
        .find_by_id(&account.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.remember_digest.is_none());
    assert!(!app.service.authenticated(&stored, &token).await);
}

#[tokio::test]
async fn test_log_in_rejections_look_alike() {
    let app = TestApp::new();
    app.service
        .register(form("Harsh", "harsh@example.com", "password"))
        .await
        .expect("Failed to register");

    let unknown = app.service.log_in("nobody@example.com", "password").await;
    let wrong = app.service.log_in("harsh@example.com", "passwordx").await;

    assert_eq!(
        unknown.map(|a| a.id).unwrap_err().to_string(),
        wrong.map(|a| a.id).unwrap_err().to_string()
    );
}
