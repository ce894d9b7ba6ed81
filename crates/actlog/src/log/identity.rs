// Identity resolution
//
// Works out who an entry is attributed to: the effective role, whether an
// administrator is masquerading, and the name, email and google id to record.

use serde::{Deserialize, Serialize};

use crate::config::ActivityLogConfig;
use crate::log::entry::ActivityLogEntryBuilder;
use crate::log::request::{AccountInfo, ActionContext, CurrentUser, UnregisteredStudent};
use crate::log::role::UserRole;
use crate::log::AUTH_NOT_LOGIN;

/// Authentication state of a request, in order of precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    /// The URL is an automated (system-triggered) action
    Automated,
    /// Nobody is logged in
    Anonymous,
    /// Someone is logged in; `google_id` is the account the action is
    /// attributed to, which is the masquerade target when masquerading
    Authenticated { google_id: String },
}

/// Outcome of identity resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub auth: AuthState,
    /// Bare role; the masquerade marker is added only on the wire
    pub role: UserRole,
    pub is_masquerade: bool,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_google_id: Option<String>,
}

impl ResolvedIdentity {
    fn new(auth: AuthState, role: UserRole) -> Self {
        Self {
            auth,
            role,
            is_masquerade: false,
            user_name: None,
            user_email: None,
            user_google_id: None,
        }
    }

    /// Copy the resolved fields onto an entry builder
    pub fn apply(&self, mut builder: ActivityLogEntryBuilder) -> ActivityLogEntryBuilder {
        builder = builder
            .with_user_role(self.role.clone())
            .with_masquerade(self.is_masquerade);
        if let Some(name) = &self.user_name {
            builder = builder.with_user_name(name.as_str());
        }
        if let Some(email) = &self.user_email {
            builder = builder.with_user_email(email.as_str());
        }
        if let Some(google_id) = &self.user_google_id {
            builder = builder.with_user_google_id(google_id.as_str());
        }
        builder
    }
}

/// Resolves roles and identities against the configured page prefixes
#[derive(Debug, Clone)]
pub struct IdentityResolver<'a> {
    config: &'a ActivityLogConfig,
}

impl<'a> IdentityResolver<'a> {
    /// Create a resolver using `config`
    pub fn new(config: &'a ActivityLogConfig) -> Self {
        Self { config }
    }

    /// Authentication state of a request to `url` made by `user`
    pub fn auth_state(&self, url: &str, user: Option<&CurrentUser>) -> AuthState {
        if self.is_automated_action(url) {
            AuthState::Automated
        } else {
            match user {
                Some(user) => AuthState::Authenticated { google_id: user.id.clone() },
                None => AuthState::Anonymous,
            }
        }
    }

    /// Identity of the caller alone, ignoring any target account
    pub fn resolve_caller(&self, servlet_name: &str, url: &str, user: Option<&CurrentUser>) -> ResolvedIdentity {
        match (self.auth_state(url, user), user) {
            (AuthState::Automated, _) => ResolvedIdentity::new(AuthState::Automated, UserRole::Auto),
            (AuthState::Authenticated { google_id }, Some(user)) => {
                let auth = AuthState::Authenticated { google_id: google_id.clone() };
                let mut identity = ResolvedIdentity::new(auth, self.role_for_user(user, servlet_name));
                identity.user_google_id = Some(google_id);
                identity
            }
            _ => {
                let mut identity = ResolvedIdentity::new(AuthState::Anonymous, UserRole::Unknown);
                identity.user_google_id = Some(AUTH_NOT_LOGIN.to_string());
                identity
            }
        }
    }

    /// Full identity of a page action
    ///
    /// A student authenticated by registration key takes precedence over the
    /// target account. When a logged-in caller acts on an account with a
    /// different google id, the entry is marked as masquerade and attributed
    /// to that account.
    pub fn resolve(&self, servlet_name: &str, ctx: &ActionContext) -> ResolvedIdentity {
        let user = ctx.current_user.as_ref();
        let mut identity = self.resolve_caller(servlet_name, &ctx.url, user);

        if let Some(student) = &ctx.unregistered_student {
            apply_unregistered_student(&mut identity, student);
        } else if let Some(account) = ctx.account.as_ref().filter(|a| a.google_id.is_some()) {
            apply_account(&mut identity, user, account);
        }

        identity
    }

    /// Base role of a logged-in user on a page, after degradation
    pub fn role_for_user(&self, user: &CurrentUser, servlet_name: &str) -> UserRole {
        if user.is_admin {
            let role = self.degrade_to_student(UserRole::Admin, servlet_name);
            self.degrade_to_instructor(role, servlet_name)
        } else if user.is_instructor && user.is_student {
            self.degrade_to_student(UserRole::Instructor, servlet_name)
        } else if user.is_student {
            UserRole::Student
        } else if user.is_instructor {
            UserRole::Instructor
        } else {
            UserRole::Unregistered(None)
        }
    }

    /// Whether `url` is an automated action
    pub fn is_automated_action(&self, url: &str) -> bool {
        url.starts_with(&self.config.auto_page_prefix)
    }

    /// Whether `servlet_name` names a student page
    pub fn is_student_page(&self, servlet_name: &str) -> bool {
        starts_with_ignore_case(servlet_name, &self.config.student_page_prefix)
    }

    /// Whether `servlet_name` names an instructor page
    pub fn is_instructor_page(&self, servlet_name: &str) -> bool {
        starts_with_ignore_case(servlet_name, &self.config.instructor_page_prefix)
            || self
                .config
                .instructor_page_aliases
                .iter()
                .any(|alias| alias.rsplit('/').next() == Some(servlet_name))
    }

    fn degrade_to_student(&self, role: UserRole, servlet_name: &str) -> UserRole {
        if self.is_student_page(servlet_name) {
            UserRole::Student
        } else {
            role
        }
    }

    fn degrade_to_instructor(&self, role: UserRole, servlet_name: &str) -> UserRole {
        if self.is_instructor_page(servlet_name) {
            UserRole::Instructor
        } else {
            role
        }
    }
}

fn apply_unregistered_student(identity: &mut ResolvedIdentity, student: &UnregisteredStudent) {
    identity.role = UserRole::unregistered_in(student.course.as_deref());
    identity.user_name = student.name.clone();
    identity.user_email = student.email.clone();
}

fn apply_account(identity: &mut ResolvedIdentity, user: Option<&CurrentUser>, account: &AccountInfo) {
    if let (Some(user), Some(target)) = (user, account.google_id.as_ref()) {
        identity.is_masquerade = user.id != *target;
        if matches!(identity.auth, AuthState::Authenticated { .. }) {
            identity.auth = AuthState::Authenticated { google_id: target.clone() };
        }
    }
    identity.user_google_id = account.google_id.clone();
    identity.user_email = account.email.clone();
    identity.user_name = account.name.clone();
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}
