// Entry generation for the different kinds of requests an action can log

use actlog::log::{encode, AccountInfo, ActionFailure, CurrentUser, ErrorReport, RequestParams, UnregisteredStudent};
use actlog::{ActionContext, ActivityLogConfig, ActivityLogGenerator, FixedClock, UserRole};
use anyhow::Result;
use pretty_assertions::assert_eq;

// 2015-11-03 17:06:18.465 at UTC+08:00
const NOW: i64 = 1_446_541_578_465;
const STAMP: &str = "20151103170618465";

fn generator() -> Result<ActivityLogGenerator<FixedClock>> {
    Ok(ActivityLogGenerator::with_clock(ActivityLogConfig::default(), FixedClock::new(NOW))?)
}

fn key_params() -> RequestParams {
    RequestParams::new()
        .with("courseid", "CS2103")
        .with("studentemail", "student@email.com")
        .with("key", "KeyABC")
}

fn admin() -> CurrentUser {
    CurrentUser::new("adminGoogleId").with_admin(true)
}

#[test]
fn test_system_error_report() -> Result<()> {
    let generator = generator()?;
    let ctx = ActionContext::new("/page/instructorHomePage")
        .with_current_user(CurrentUser::new("googleId").with_instructor(true));
    let report = ErrorReport::new("NullPointerException", "at Foo.bar(Foo.java:1)");

    let entry = generator.system_error_report(&ctx, Some(&report));
    assert_eq!(entry.action_name(), "System Error Report");
    assert_eq!(entry.servlet_name(), "instructorHomePage");
    assert_eq!(entry.role(), &UserRole::Instructor);
    assert!(entry
        .message()
        .starts_with("<span class=\"text-danger\">NullPointerException</span>"));
    assert!(entry.message().contains("at Foo.bar(Foo.java:1)"));

    let entry = generator.system_error_report(&ctx, None);
    assert_eq!(entry.message(), "Unknown");
    Ok(())
}

#[test]
fn test_action_failure() -> Result<()> {
    let generator = generator()?;
    let ctx = ActionContext::new("/page/randomPage")
        .with_params(RequestParams::new().with("courseid", "CS2103"))
        .with_current_user(CurrentUser::new("googleId").with_student(true));
    let error: Box<dyn std::error::Error + Send + Sync> = "disk full".into();
    let failure = ActionFailure::new("EntityDoesNotExistException", &*error);

    let entry = generator.action_failure(&ctx, &failure);
    assert_eq!(entry.action_name(), "Servlet Action Failure");
    assert_eq!(entry.servlet_name(), "randomPage");
    assert_eq!(entry.role(), &UserRole::Student);
    assert_eq!(entry.id(), format!("googleId%{}", STAMP));
    assert!(entry
        .message()
        .starts_with("<span class=\"text-danger\">Servlet Action failure in randomPage<br>"));
    assert!(entry.message().contains("<br>EntityDoesNotExistException: disk full<br>"));
    assert!(entry.message().contains(r#"{"courseid":["CS2103"]}"#));
    Ok(())
}

#[test]
fn test_basic_action_of_automated_task() -> Result<()> {
    let entry = generator()?.basic_action(&ActionContext::new("/auto/feedbackSessionClosedReminders"), "Reminders sent");

    assert_eq!(entry.servlet_name(), "feedbackSessionClosedReminders");
    assert_eq!(entry.role(), &UserRole::Auto);
    assert_eq!(entry.id(), format!("Auto%{}", STAMP));
    assert_eq!(entry.message(), "Reminders sent");
    Ok(())
}

#[test]
fn test_basic_action_ignores_current_user() -> Result<()> {
    let ctx = ActionContext::new("/public/publicImageServlet").with_current_user(admin());
    let entry = generator()?.basic_action(&ctx, "Image served");

    assert_eq!(entry.role(), &UserRole::Auto);
    assert_eq!(entry.user_google_id(), "Unknown");
    assert_eq!(entry.id(), format!("Unknown%{}", STAMP));
    Ok(())
}

#[test]
fn test_page_action_not_logged_in() -> Result<()> {
    let entry = generator()?.page_action(&ActionContext::new("/page/studentHomePage"), "View home");

    assert_eq!(entry.role(), &UserRole::Unknown);
    assert_eq!(entry.user_google_id(), "Unknown");
    assert_eq!(entry.user_name(), "Unknown");
    assert_eq!(entry.id(), format!("Unknown%{}", STAMP));
    assert!(!entry.is_masquerade());
    Ok(())
}

#[test]
fn test_page_action_with_unsuccessful_registration_key() -> Result<()> {
    let ctx = ActionContext::new("/page/studentCourseJoin").with_params(key_params());
    let entry = generator()?.page_action(&ctx, "Join course");

    assert_eq!(entry.role(), &UserRole::Unknown);
    assert_eq!(entry.id(), format!("student@email.com%CS2103%{}", STAMP));
    Ok(())
}

#[test]
fn test_page_action_with_registration_key() -> Result<()> {
    let ctx = ActionContext::new("/page/studentCourseJoin")
        .with_params(key_params())
        .with_unregistered_student(UnregisteredStudent::new("Joe", "student@email.com", "CS2103"));
    let entry = generator()?.page_action(&ctx, "Join course");

    assert_eq!(entry.role().to_string(), "Unregistered:CS2103");
    assert_eq!(entry.user_name(), "Joe");
    assert_eq!(entry.user_email(), "student@email.com");
    assert_eq!(entry.user_google_id(), "Unknown");
    assert_eq!(entry.id(), format!("student@email.com%CS2103%{}", STAMP));
    assert!(encode(&entry).contains("|||Unregistered:CS2103|||Joe|||Unknown|||student@email.com|||"));
    Ok(())
}

#[test]
fn test_page_action_of_instructor() -> Result<()> {
    let ctx = ActionContext::new("/page/instructorHomePage?course=CS2103")
        .with_current_user(CurrentUser::new("instructorId").with_instructor(true))
        .with_account(AccountInfo::new("instructorId", "Ian", "ian@email.com"));
    let entry = generator()?.page_action(&ctx, "View home");

    assert_eq!(entry.servlet_name(), "instructorHomePage");
    assert_eq!(entry.action_name(), "instructorHomePage");
    assert_eq!(entry.url(), "/page/instructorHomePage?course=CS2103");
    assert_eq!(entry.role(), &UserRole::Instructor);
    assert_eq!(entry.user_name(), "Ian");
    assert_eq!(entry.user_email(), "ian@email.com");
    assert_eq!(entry.id(), format!("instructorId%{}", STAMP));
    assert!(!entry.is_masquerade());
    Ok(())
}

#[test]
fn test_page_action_of_user_without_capabilities() -> Result<()> {
    let generator = generator()?;
    for url in ["/page/studentHomePage", "/page/instructorHomePage"] {
        let ctx = ActionContext::new(url).with_current_user(CurrentUser::new("newUser"));
        let entry = generator.page_action(&ctx, "View");
        assert_eq!(entry.role(), &UserRole::Unregistered(None));
        assert_eq!(entry.role().to_string(), "Unregistered");
    }
    Ok(())
}

#[test]
fn test_page_action_of_instructor_who_is_student() -> Result<()> {
    let generator = generator()?;
    let user = CurrentUser::new("both").with_instructor(true).with_student(true);

    let on_student_page = ActionContext::new("/page/studentHomePage").with_current_user(user.clone());
    assert_eq!(generator.page_action(&on_student_page, "View").role(), &UserRole::Student);

    let on_instructor_page = ActionContext::new("/page/instructorCoursesPage").with_current_user(user);
    assert_eq!(generator.page_action(&on_instructor_page, "View").role(), &UserRole::Instructor);
    Ok(())
}

#[test]
fn test_page_action_of_admin_is_degraded_by_page() -> Result<()> {
    let generator = generator()?;
    let cases = [
        ("/page/studentHomePage", UserRole::Student),
        ("/page/instructorHomePage", UserRole::Instructor),
        ("/page/feedbackSessionStatsPage", UserRole::Instructor),
        ("/admin/adminHomePage", UserRole::Admin),
    ];
    for (url, role) in cases {
        let ctx = ActionContext::new(url).with_current_user(admin());
        assert_eq!(generator.page_action(&ctx, "View").role(), &role, "{}", url);
    }
    Ok(())
}

#[test]
fn test_page_action_of_masquerading_admin() -> Result<()> {
    let ctx = ActionContext::new("/page/instructorHomePage")
        .with_current_user(admin())
        .with_account(AccountInfo::new("anotherGoogleId", "Another", "another@email.com"));
    let entry = generator()?.page_action(&ctx, "View home");

    assert!(entry.is_masquerade());
    assert_eq!(entry.role(), &UserRole::Instructor);
    assert_eq!(entry.user_google_id(), "anotherGoogleId");
    assert_eq!(entry.id(), format!("anotherGoogleId%{}", STAMP));
    assert!(encode(&entry).contains("|||Instructor(M)|||Another|||anotherGoogleId|||another@email.com|||"));
    Ok(())
}

#[test]
fn test_page_action_of_automated_url() -> Result<()> {
    let ctx = ActionContext::new("/auto/compileLogs").with_current_user(admin());
    let entry = generator()?.page_action(&ctx, "Compiled");

    assert_eq!(entry.role(), &UserRole::Auto);
    assert_eq!(entry.id(), format!("Auto%{}", STAMP));
    Ok(())
}
