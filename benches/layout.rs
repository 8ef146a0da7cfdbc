use std::io;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use edl_layout::logging::{LogEvent, LogSink, LoggingResult};
use edl_layout::{
    AlignmentChoice, Designer, DesignerConfig, Layout, LayoutPlacement, Logger, NodeId, Result,
    Widget, WidgetKind,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const ROWS: usize = 24;

fn layout_build_panel(c: &mut Criterion) {
    c.bench_function("layout_build_panel", |b| {
        b.iter(|| build_panel(black_box(ROWS)).expect("panel"));
    });
}

fn layout_respacing(c: &mut Criterion) {
    let (mut designer, columns) = build_panel(ROWS).expect("panel");
    let mut spacing = 0;
    c.bench_function("layout_respacing", |b| {
        b.iter(|| {
            spacing = (spacing + 1) % 12;
            for column in &columns {
                designer
                    .tree_mut()
                    .set_spacing(*column, black_box(spacing))
                    .expect("spacing");
            }
        });
    });
}

fn render_document(c: &mut Criterion) {
    let (designer, _) = build_panel(ROWS).expect("panel");
    c.bench_function("render_document", |b| {
        b.iter(|| {
            let mut sink = io::sink();
            designer.dump(&mut sink).expect("dump");
        });
    });
}

/// Two labelled columns of readbacks side by side, as on a typical
/// device overview screen.
fn build_panel(rows: usize) -> Result<(Designer, Vec<NodeId>)> {
    let mut config = DesignerConfig::default().with_logger(Logger::new(NullSink));
    config.enable_metrics();
    let mut designer = Designer::new(config);

    let mut columns = Vec::new();
    for column in 0..2 {
        let vbox = designer.tree_mut().insert_layout(
            Layout::vertical()
                .with_name(format!("column-{column}"))
                .with_alignment(AlignmentChoice::Right)?,
        );
        for row in 0..rows {
            let row_box = row_widget(&mut designer, column, row)?;
            designer.tree_mut().add_layout(vbox, row_box)?;
        }
        columns.push(vbox);
    }

    let hbox = designer
        .tree_mut()
        .insert_layout(Layout::horizontal().with_spacing(20)?);
    for column in &columns {
        designer.tree_mut().add_layout(hbox, *column)?;
    }
    designer.set_layout(hbox, LayoutPlacement::Resize)?;
    Ok((designer, columns))
}

fn row_widget(designer: &mut Designer, column: usize, row: usize) -> Result<NodeId> {
    let tree = designer.tree_mut();
    let mut label = Widget::new(WidgetKind::StaticText)
        .with_attr("text", format!("PV {column}:{row}"))?
        .with_attr("alignment", AlignmentChoice::Left)?;
    label.fit_to_text()?;
    let label = tree.insert_widget(label);
    let frame = tree.insert_widget(Widget::new(WidgetKind::Rectangle).with_size(80, 18)?);
    let hbox = tree.insert_layout(Layout::horizontal().with_alignment(AlignmentChoice::Center)?);
    tree.add_widgets(hbox, &[label, frame])?;
    Ok(hbox)
}

criterion_group!(benches, layout_build_panel, layout_respacing, render_document);
criterion_main!(benches);
