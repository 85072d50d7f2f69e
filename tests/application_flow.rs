use std::sync::Arc;

use axkit::{
    map_members, member_values, AppError, Application, Arg, AxConfig, Criteria, Desktop,
    ElementRef, Lookup, MenuPath, Resolution, Value,
};
use element_transport::mock::{MockApp, MockElement, MockProcesses, MockTree};
use regex::Regex;

struct Fixture {
    tree: Arc<MockTree>,
    processes: Arc<MockProcesses>,
    desktop: Desktop,
    app: ElementRef,
    bar_item: ElementRef,
}

fn fast_config() -> AxConfig {
    let mut config = AxConfig::default();
    config.wait.poll_interval_ms = 10;
    config.app.state_change_timeout_ms = 60;
    config.app.launch_retry_delay_ms = 5;
    config.app.launch_attempts = 4;
    config.app.window_timeout_ms = 500;
    config
}

/// Mail: a window, and a menu bar with Mail > [About Mail, Settings…]
fn mail() -> Fixture {
    let tree = Arc::new(MockTree::new());
    let app = tree.add_root(MockElement::new("AXApplication").attribute("AXTitle", "Mail"));
    tree.add_child(
        &app,
        MockElement::new("AXWindow").attribute("AXTitle", "Inbox"),
    );

    let bar = tree.add_root(MockElement::new("AXMenuBar"));
    let bar_item = tree.add_child(
        &bar,
        MockElement::new("AXMenuBarItem")
            .attribute("AXTitle", "Mail")
            .action("AXPress")
            .action("AXCancel"),
    );
    let menu = tree.add_child(&bar_item, MockElement::new("AXMenu"));
    let about = tree.add_child(
        &menu,
        MockElement::new("AXMenuItem")
            .attribute("AXTitle", "About Mail")
            .action("AXPress"),
    );
    tree.add_child(
        &menu,
        MockElement::new("AXMenuItem")
            .attribute("AXTitle", "Settings…")
            .action("AXPress"),
    );
    tree.set_value(&app, "AXMenuBar", bar);

    let about_window_parent = app.clone();
    tree.on_action(&about, "AXPress", move |tree| {
        tree.add_child(
            &about_window_parent,
            MockElement::new("AXWindow").attribute("AXTitle", "About Mail"),
        );
    });

    let processes = Arc::new(MockProcesses::new());
    processes.add_running(MockApp::new("com.apple.mail", "Mail", app.clone()));
    let desktop = Desktop::new(tree.clone(), processes.clone(), fast_config());

    Fixture {
        tree,
        processes,
        desktop,
        app,
        bar_item,
    }
}

#[tokio::test]
async fn connects_by_bundle_name_or_pid() {
    let fx = mail();

    let by_bundle = fx.desktop.application("com.apple.mail").await.unwrap();
    let by_name = fx.desktop.application("Mail").await.unwrap();
    let by_pid = fx.desktop.application(by_bundle.pid()).await.unwrap();

    assert_eq!(by_bundle.node(), by_name.node());
    assert_eq!(by_pid.node().element(), &fx.app);
    assert_eq!(by_bundle.title().await.unwrap(), "Mail");
    assert_eq!(fx.processes.launch_count(), 0);
}

#[tokio::test]
async fn launches_installed_bundle_after_retries() {
    let fx = mail();
    let notes = fx.tree.add_root(MockElement::new("AXApplication").attribute("AXTitle", "Notes"));
    fx.processes
        .install(MockApp::new("com.apple.notes", "Notes", notes.clone()), 2);

    let app = fx.desktop.application("com.apple.notes").await.unwrap();

    assert_eq!(app.node().element(), &notes);
    assert_eq!(fx.processes.launch_count(), 2);
}

#[tokio::test]
async fn unknown_bundle_fails_fast() {
    let fx = mail();

    let err = fx.desktop.application("com.example.nothing").await.unwrap_err();

    assert!(matches!(err, AppError::UnknownBundle(ref bundle) if bundle == "com.example.nothing"));
    assert_eq!(fx.processes.launch_count(), 1);
}

#[tokio::test]
async fn slow_launch_times_out() {
    let fx = mail();
    let slow = fx.tree.add_root(MockElement::new("AXApplication"));
    fx.processes
        .install(MockApp::new("com.example.slow", "Slow", slow), 50);

    let err = fx.desktop.application("com.example.slow").await.unwrap_err();

    assert!(matches!(err, AppError::LaunchTimeout { attempts: 4, .. }));
    assert_eq!(fx.processes.launch_count(), 4);
}

#[tokio::test]
async fn hide_and_unhide_wait_for_the_new_state() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();

    assert!(!app.is_hidden().await.unwrap());
    assert!(app.hide().await.unwrap());
    assert!(app.is_hidden().await.unwrap());
    assert!(app.unhide().await.unwrap());
    assert!(app.is_active().await.unwrap());
    assert!(app.terminate().await.unwrap());
    assert!(app.is_terminated().await.unwrap());
}

#[tokio::test]
async fn unresponsive_app_reports_failed_state_change() {
    let fx = mail();
    let stuck = fx.tree.add_root(MockElement::new("AXApplication"));
    let pid = fx
        .processes
        .add_running(MockApp::new("com.example.stuck", "Stuck", stuck).unresponsive());
    let app = fx.desktop.application(pid).await.unwrap();

    assert!(!app.hide().await.unwrap());
    assert!(!app.is_hidden().await.unwrap());
    assert!(!app.unhide().await.unwrap());
    assert!(!app.is_active().await.unwrap());
    assert!(app.force_terminate().await.unwrap());
}

#[tokio::test]
async fn unhide_brings_a_background_app_forward() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();
    assert!(!app.is_hidden().await.unwrap());
    assert!(!app.is_active().await.unwrap());

    let focused = app
        .resolve("focused=", vec![Arg::from(Value::from(true))])
        .await
        .unwrap();

    assert!(matches!(focused, Resolution::Performed(true)));
    assert!(app.is_active().await.unwrap());

    let other = fx.tree.add_root(MockElement::new("AXApplication"));
    let other_pid = fx
        .processes
        .add_running(MockApp::new("com.apple.notes", "Notes", other));
    let notes = fx.desktop.application(other_pid).await.unwrap();
    assert!(notes.unhide().await.unwrap());
    assert!(!app.is_active().await.unwrap());

    assert!(app.unhide().await.unwrap());
    assert!(app.is_active().await.unwrap());
    assert!(!notes.is_active().await.unwrap());
}

#[tokio::test]
async fn frontmost_and_menu_bar_owner_can_differ() {
    let fx = mail();
    assert!(matches!(
        Application::frontmost_application(&fx.desktop).await,
        Err(AppError::NotFound(_))
    ));

    let mail = fx.desktop.application("Mail").await.unwrap();
    mail.unhide().await.unwrap();
    let frontmost = Application::frontmost_application(&fx.desktop).await.unwrap();
    assert_eq!(frontmost.pid(), mail.pid());
    let owner = Application::menu_bar_owner(&fx.desktop).await.unwrap();
    assert_eq!(owner.pid(), mail.pid());

    let agent = fx.tree.add_root(MockElement::new("AXApplication"));
    let agent_pid = fx
        .processes
        .add_running(MockApp::new("com.example.agent", "Agent", agent.clone()));
    fx.processes.set_menu_bar_owner(agent_pid);

    let owner = Application::menu_bar_owner(&fx.desktop).await.unwrap();
    assert_eq!(owner.node().element(), &agent);
    let frontmost = Application::frontmost_application(&fx.desktop).await.unwrap();
    assert_eq!(frontmost.pid(), mail.pid());
}

#[tokio::test]
async fn focus_and_visibility_are_writable() {
    let fx = mail();
    let prefs = fx.tree.add_root(
        MockElement::new("AXApplication")
            .attribute("AXTitle", "Prefs")
            .writable_attribute("AXValue", "on"),
    );
    let pid = fx
        .processes
        .add_running(MockApp::new("com.example.prefs", "Prefs", prefs));
    let app = fx.desktop.application(pid).await.unwrap();

    for name in ["focused", "focused?", "hidden", "hidden?", "hidden="] {
        assert!(app.is_writable(name).await.unwrap(), "{name}");
    }
    assert!(!app.is_writable("title").await.unwrap());
    assert!(app.is_writable("value").await.unwrap());
    assert!(!app.is_writable("nonexistent").await.unwrap());
}

#[tokio::test]
async fn resolve_intercepts_lifecycle_names() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();

    let hidden = app.resolve("hidden?", vec![]).await.unwrap();
    assert_eq!(hidden.into_value(), Some(Value::Bool(false)));

    let set = app
        .resolve("hidden=", vec![Arg::from(Value::from(true))])
        .await
        .unwrap();
    assert!(matches!(set, Resolution::Performed(true)));
    assert!(app.is_hidden().await.unwrap());

    let focused = app
        .resolve("focused=", vec![Arg::from(Value::from(true))])
        .await
        .unwrap();
    assert!(matches!(focused, Resolution::Performed(true)));
    assert!(!app.is_hidden().await.unwrap());

    let title = app.resolve("title", vec![]).await.unwrap();
    assert_eq!(title.into_value(), Some(Value::from("Mail")));

    assert!(matches!(
        app.resolve("hidden=", vec![]).await,
        Err(AppError::Ax(_))
    ));
}

#[tokio::test]
async fn navigate_menu_returns_unpressed_item() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();

    let item = app
        .navigate_menu(&["Mail".into(), "Settings…".into()])
        .await
        .unwrap();

    assert_eq!(item.get_attribute("title").await.unwrap(), Value::from("Settings…"));
    let pressed: Vec<String> = fx.tree.invocations().into_iter().map(|(_, a)| a).collect();
    assert_eq!(pressed, vec!["AXPress".to_string()]);
}

#[tokio::test]
async fn missing_menu_item_cancels_open_menu() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();

    let err = app
        .select_menu_item(&["Mail".into(), "Quit Everything".into()])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::MenuItemNotFound { ref item, ref parent } if item == "Quit Everything" && parent == "Mail"
    ));
    assert!(fx
        .tree
        .invocations()
        .contains(&(fx.bar_item.clone(), "AXCancel".to_string())));

    assert!(matches!(
        app.navigate_menu(&[]).await,
        Err(AppError::EmptyMenuPath)
    ));
}

#[tokio::test]
async fn about_window_appears_after_menu_selection() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();
    assert_eq!(app.windows().await.unwrap().len(), 1);

    let about = app.show_about_window().await.unwrap().unwrap();

    assert_eq!(about.get_attribute("title").await.unwrap(), Value::from("About Mail"));
    assert_eq!(app.windows().await.unwrap().len(), 2);
}

#[tokio::test]
async fn no_new_window_times_out_with_none() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();
    let before = app.windows().await.unwrap();

    assert!(app.wait_for_new_window(&before).await.unwrap().is_none());
}

#[tokio::test]
async fn menu_items_by_pattern_and_member_values() {
    let fx = mail();
    let app = fx.desktop.application("Mail").await.unwrap();
    let bar = app
        .node()
        .adopt_value(app.node().get_attribute("menu_bar").await.unwrap())
        .unwrap();

    let items = bar
        .find_all(
            "menu_item",
            Criteria::new().matching("title", Regex::new("…$").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(items.len(), 1);

    let all = bar.find_all("menu_item", Criteria::new()).await.unwrap();
    let titles = member_values(&all, "titles").await.unwrap();
    assert_eq!(titles, vec![Value::from("About Mail"), Value::from("Settings…")]);

    let members = map_members(&all, "menus").await.unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(Option::is_none));

    let bar_items = bar.find_all("menu_bar_item", Criteria::new()).await.unwrap();
    let menus = map_members(&bar_items, "menus").await.unwrap();
    assert_eq!(menus.len(), 1);
    assert!(matches!(&menus[0], Some(Lookup::Search(found)) if found.count() == 1));
}

#[tokio::test]
async fn well_known_applications_resolve_by_bundle() {
    let fx = mail();
    let dock = fx.tree.add_root(MockElement::new("AXApplication").attribute("AXTitle", "Dock"));
    fx.processes
        .add_running(MockApp::new("com.apple.dock", "Dock", dock.clone()));

    let app = Application::dock(&fx.desktop).await.unwrap();
    assert_eq!(app.node().element(), &dock);

    assert!(matches!(
        Application::finder(&fx.desktop).await,
        Err(AppError::UnknownBundle(_))
    ));
}

#[test]
fn menu_path_conversions() {
    assert!(matches!(MenuPath::from("File"), MenuPath::Title(ref t) if t == "File"));
    assert!(matches!(
        MenuPath::from(Regex::new("^Open").unwrap()),
        MenuPath::Pattern(_)
    ));
}
