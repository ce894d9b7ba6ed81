// Activity log entry generation
//
// Builds ready-to-encode entries for the four places an action logs from:
// a normal page action, an action failure, a system error report and a basic
// (automated or public) action.

use actlog_error::ConfigResult;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::clock::{ClockSource, SystemClock};
use crate::config::ActivityLogConfig;
use crate::log::entry::{ActivityLogEntry, ActivityLogEntryBuilder};
use crate::log::id::LogIdGenerator;
use crate::log::identity::{IdentityResolver, ResolvedIdentity};
use crate::log::request::{ActionContext, ActionFailure, ErrorReport, RequestParams};
use crate::log::role::UserRole;
use crate::log::{ACTION_RESULT_FAILURE, ACTION_RESULT_SYSTEM_ERROR_REPORT};

/// Servlet name used when a URL has no recognisable action name
pub const MESSAGE_ERROR_ACTION_NAME: &str = "Error when getting ActionName for requestUrl : ";

static ACTION_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\S*/(?P<action>\S*)$").expect("action name pattern is valid"));

/// Servlet name of the action at `url`: the last segment of its path
pub fn action_name_from_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    match ACTION_NAME_PATTERN.captures(path) {
        Some(captures) => captures["action"].to_string(),
        None => format!("{}{}", MESSAGE_ERROR_ACTION_NAME, url),
    }
}

/// Factory of activity log entries
#[derive(Debug, Clone)]
pub struct ActivityLogGenerator<C: ClockSource = SystemClock> {
    config: ActivityLogConfig,
    ids: LogIdGenerator,
    clock: C,
}

impl ActivityLogGenerator<SystemClock> {
    /// Create a generator reading the system clock
    pub fn new(config: ActivityLogConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: ClockSource> ActivityLogGenerator<C> {
    /// Create a generator reading `clock`
    pub fn with_clock(config: ActivityLogConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        let ids = LogIdGenerator::new(
            config.admin_offset()?,
            config.course_id_param.as_str(),
            config.student_email_param.as_str(),
        );
        Ok(Self { config, ids, clock })
    }

    pub fn config(&self) -> &ActivityLogConfig {
        &self.config
    }

    /// Entry for a page action
    ///
    /// Resolves the full identity, including registration-key students and
    /// masquerading administrators.
    pub fn page_action(&self, ctx: &ActionContext, message: &str) -> ActivityLogEntry {
        let servlet_name = action_name_from_url(&ctx.url);
        let identity = IdentityResolver::new(&self.config).resolve(&servlet_name, ctx);
        self.assemble(servlet_name, &ctx.url, &ctx.params, identity)
            .with_message(message)
            .build()
    }

    /// Entry for an action that ended in `failure`
    ///
    /// Only the caller is identified; the message records the error class,
    /// its causes, the backtrace when one was captured and the request
    /// parameters.
    pub fn action_failure(&self, ctx: &ActionContext, failure: &ActionFailure) -> ActivityLogEntry {
        let servlet_name = action_name_from_url(&ctx.url);
        let identity = IdentityResolver::new(&self.config).resolve_caller(
            &servlet_name,
            &ctx.url,
            ctx.current_user.as_ref(),
        );
        let message = failure_message(&servlet_name, failure, &ctx.params);
        self.assemble(servlet_name, &ctx.url, &ctx.params, identity)
            .with_action_name(ACTION_RESULT_FAILURE)
            .with_message(message)
            .build()
    }

    /// Entry for a system error report sent to the administrators
    ///
    /// The report's content is kept in a hidden block keyed by the report's
    /// detail key so the dashboard stays compact.
    pub fn system_error_report(&self, ctx: &ActionContext, report: Option<&ErrorReport>) -> ActivityLogEntry {
        let servlet_name = action_name_from_url(&ctx.url);
        let identity = IdentityResolver::new(&self.config).resolve_caller(
            &servlet_name,
            &ctx.url,
            ctx.current_user.as_ref(),
        );
        let mut builder = self
            .assemble(servlet_name, &ctx.url, &ctx.params, identity)
            .with_action_name(ACTION_RESULT_SYSTEM_ERROR_REPORT);
        if let Some(report) = report {
            builder = builder.with_message(error_report_message(report));
        }
        builder.build()
    }

    /// Entry for an automated task or a public resource
    ///
    /// The caller is not identified and the role is always `Auto`.
    pub fn basic_action(&self, ctx: &ActionContext, message: &str) -> ActivityLogEntry {
        let servlet_name = action_name_from_url(&ctx.url);
        let mut identity = IdentityResolver::new(&self.config).resolve_caller(&servlet_name, &ctx.url, None);
        identity.role = UserRole::Auto;
        self.assemble(servlet_name, &ctx.url, &ctx.params, identity)
            .with_message(message)
            .build()
    }

    fn assemble(
        &self,
        servlet_name: String,
        url: &str,
        params: &RequestParams,
        identity: ResolvedIdentity,
    ) -> ActivityLogEntryBuilder {
        let time = self.clock.now_millis();
        let id = self.ids.generate(&identity.auth, params, time);
        debug!(id = %id, role = %identity.role, masquerade = identity.is_masquerade, "Generating activity log entry");

        let builder = ActivityLogEntry::builder(servlet_name.as_str(), url, time)
            .with_action_name(servlet_name)
            .with_log_id(id);
        identity.apply(builder)
    }
}

fn failure_message(servlet_name: &str, failure: &ActionFailure, params: &RequestParams) -> String {
    let trace = failure
        .backtrace
        .as_deref()
        .map(|trace| format!("<br>{}", trace.trim_end().replace('\n', "<br>")))
        .unwrap_or_default();

    format!(
        "<span class=\"text-danger\">Servlet Action failure in {}<br>{}: {}{}<br>{}</span>",
        servlet_name,
        failure.class,
        failure.detail,
        trace,
        params.to_json()
    )
}

fn error_report_message(report: &ErrorReport) -> String {
    let key = report.detail_key();
    format!(
        "<span class=\"text-danger\">{subject}</span><br>\
         <a href=\"#\" onclick=\"showHideErrorMessage('error{key}');\">Show/Hide Details >></a><br>\
         <span id=\"error{key}\" style=\"display: none;\">{content}</span>",
        subject = report.subject,
        key = key,
        content = report.content
    )
}
