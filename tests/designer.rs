use std::fs;
use std::sync::Arc;

use edl_layout::{
    AttrValue, Designer, DesignerConfig, Display, Layout, LayoutPlacement, LogLevel, Logger,
    MemorySink, NodeId, SaveOutcome, Widget, WidgetKind, find_screen_size,
};

fn boxed_designer(config: DesignerConfig) -> (Designer, NodeId, NodeId) {
    let mut designer = Designer::new(config);
    let tree = designer.tree_mut();
    let frame = tree.insert_widget(Widget::new(WidgetKind::Rectangle).with_size(100, 200).unwrap());
    let label = tree.insert_widget(
        Widget::new(WidgetKind::StaticText)
            .with_size(200, 100)
            .unwrap()
            .with_attr("text", "Motor")
            .unwrap(),
    );
    let vbox = tree.insert_layout(Layout::vertical());
    tree.add_widgets(vbox, &[frame, label]).unwrap();
    designer.set_layout(vbox, LayoutPlacement::Resize).unwrap();
    (designer, vbox, label)
}

#[test]
fn save_skips_identical_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("motor.edl");
    let (mut designer, _, label) = boxed_designer(DesignerConfig::default());

    assert_eq!(designer.save(&path).unwrap(), SaveOutcome::Written);
    assert_eq!(designer.save(&path).unwrap(), SaveOutcome::Unchanged);

    fs::write(&path, "edited by hand").unwrap();
    assert_eq!(designer.save(&path).unwrap(), SaveOutcome::Written);

    designer
        .tree_mut()
        .set_attr(label, "text", "Pump")
        .unwrap();
    assert_eq!(designer.save(&path).unwrap(), SaveOutcome::Written);
    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("\"Pump\""));
    assert_eq!(saved, designer.render_document().unwrap());
}

#[test]
fn saved_screen_size_feeds_embedded_autoscale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("child.edl");
    let (mut designer, _, _) = boxed_designer(DesignerConfig::default());
    designer.save(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(find_screen_size(&text).unwrap(), (210, 315));

    let display = Display::from_edl(&path).unwrap();
    assert_eq!(display.name, "child");
    let window = Widget::from_attrs(
        WidgetKind::EmbeddedWindow,
        [("displays", AttrValue::Displays(vec![display]))],
    )
    .unwrap();
    assert_eq!((window.w(), window.h()), (210, 315));
}

#[test]
fn dump_matches_rendered_document() {
    let (designer, vbox, _) = boxed_designer(DesignerConfig::default());
    let mut out = Vec::new();
    designer.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, designer.render_document().unwrap());
    assert!(text.ends_with(&format!("{}\n", designer.render(vbox).unwrap())));
    assert_eq!(text.matches("beginObjectProperties").count(), 2);
}

#[test]
fn metrics_and_logs_follow_the_designer() {
    let sink = Arc::new(MemorySink::new());
    let mut config = DesignerConfig::default().with_logger(Logger::from_shared(sink.clone()));
    config.enable_metrics();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.edl");

    let (mut designer, _, _) = boxed_designer(config);
    designer.save(&path).unwrap();
    designer.save(&path).unwrap();

    let snapshot = designer.emit_metrics().unwrap();
    assert!(snapshot.arrangements > 0);
    assert_eq!(snapshot.documents_written, 1);
    assert_eq!(snapshot.writes_skipped, 1);
    assert_eq!(snapshot.blocks_rendered, 4);

    let saved: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|event| event.message == "document_saved")
        .collect();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].fields["skipped"], serde_json::json!(true));
    assert!(
        sink.at_level(LogLevel::Info)
            .iter()
            .any(|event| event.message == "layout_metrics" && event.target == "edl::metrics")
    );
}

#[test]
fn config_file_drives_screen_and_metrics() {
    let config = DesignerConfig::from_json_str(
        r#"{"screen": {"w": 400, "h": 300, "title": "Pumps"}, "metrics": true}"#,
    )
    .unwrap();
    assert!(config.metrics.is_some());
    let designer = Designer::new(config);
    assert_eq!((designer.screen().w(), designer.screen().h()), (400, 300));
    assert_eq!(designer.screen().title.as_deref(), Some("Pumps"));
    assert!(designer.emit_metrics().is_some());
}

#[test]
fn overflowing_layout_is_kept_and_logged() {
    let sink = Arc::new(MemorySink::new());
    let config = DesignerConfig::default().with_logger(Logger::from_shared(sink.clone()));
    let mut designer = Designer::new(config);
    let wide = designer
        .tree_mut()
        .insert_widget(Widget::new(WidgetKind::Plain).with_size(2000, 50).unwrap());
    let hbox = designer.tree_mut().insert_layout(Layout::horizontal());
    designer.tree_mut().add_widget(hbox, wide).unwrap();
    designer.set_layout(hbox, LayoutPlacement::Origin(0, 0)).unwrap();

    assert_eq!(designer.widgets(), &[hbox]);
    assert!(
        sink.at_level(LogLevel::Warn)
            .iter()
            .any(|event| event.message == "layout_overflows_screen")
    );
}
