//! Field validation pipeline.
//!
//! Raw forms are turned into commands by running every field rule in
//! order and collecting all failures, so a caller can report them together.
//! Uniqueness needs the store, so the service resolves it beforehand and
//! passes the answer in as [`EmailAvailability`].

use crate::account::errors::Field;
use crate::account::errors::ValidationErrors;
use crate::account::errors::ValidationReason;
use crate::account::models::AccountChanges;
use crate::account::models::AccountName;
use crate::account::models::CreateAccountCommand;
use crate::account::models::EmailAddress;
use crate::account::models::Password;
use crate::account::models::RegistrationForm;
use crate::account::models::UpdateAccountCommand;

/// Whether the submitted email already belongs to another account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailAvailability {
    Available,
    Taken,
}

fn check_confirmation(
    errors: &mut ValidationErrors,
    password: &str,
    confirmation: Option<&str>,
) {
    if let Some(confirmation) = confirmation {
        if confirmation != password {
            errors.push(
                Field::PasswordConfirmation,
                ValidationReason::ConfirmationMismatch,
            );
        }
    }
}

fn check_availability(errors: &mut ValidationErrors, availability: EmailAvailability) {
    if availability == EmailAvailability::Taken {
        errors.push(Field::Email, ValidationReason::NotUnique);
    }
}

impl RegistrationForm {
    /// Validate a sign-up form.
    ///
    /// A blank password is rejected here, unlike on update.
    ///
    /// # Errors
    /// Every failing rule across name, email, password and confirmation
    pub fn try_into_command(
        self,
        availability: EmailAvailability,
    ) -> Result<CreateAccountCommand, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.check(Field::Name, AccountName::new(self.name));
        let email = errors.check(Field::Email, EmailAddress::new(self.email));
        if email.is_some() {
            check_availability(&mut errors, availability);
        }
        check_confirmation(
            &mut errors,
            &self.password,
            self.password_confirmation.as_deref(),
        );
        let password = errors.check(Field::Password, Password::new(self.password));

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => {
                Ok(CreateAccountCommand {
                    name,
                    email,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

impl AccountChanges {
    /// Validate an edit.
    ///
    /// # Errors
    /// Every failing rule across the supplied fields
    pub fn try_into_command(
        self,
        availability: EmailAvailability,
    ) -> Result<UpdateAccountCommand, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match self.name {
            Some(name) => errors.check(Field::Name, AccountName::new(name)),
            None => None,
        };

        let email = match self.email {
            Some(email) => {
                let email = errors.check(Field::Email, EmailAddress::new(email));
                if email.is_some() {
                    check_availability(&mut errors, availability);
                }
                email
            }
            None => None,
        };

        let password = match self.password {
            Some(password) if !password.trim().is_empty() => {
                check_confirmation(
                    &mut errors,
                    &password,
                    self.password_confirmation.as_deref(),
                );
                errors.check(Field::Password, Password::new(password))
            }
            _ => None,
        };

        if errors.is_empty() {
            Ok(UpdateAccountCommand {
                name,
                email,
                password,
            })
        } else {
            Err(errors)
        }
    }
}
