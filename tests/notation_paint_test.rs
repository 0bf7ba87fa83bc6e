//! Paint pipeline tests against an instrumented engine

mod common;

use common::{drawn_elements, visited_pages, MockScore};
use notation_wasm::notation::SelectMode;
use notation_wasm::{DrawCommand, Notation, PointF, RecordingSurface, RectF, ViewMode};

/// Five 100-wide pages with 10 units between them: 0, 110, 220, 330, 440
fn strip_of_pages() -> MockScore {
    (0..5).fold(MockScore::new("Strip"), |score, i| {
        score.page_at(i as f64 * 110.0, 100.0)
    })
}

fn paint(notation: &mut Notation, visible: RectF) -> (RecordingSurface, notation_wasm::PaintStats) {
    let mut surface = RecordingSurface::new();
    let stats = notation.paint(&mut surface, visible);
    (surface, stats)
}

#[test]
fn test_empty_page_list_draws_nothing() {
    let mut notation = Notation::with_score(Box::new(MockScore::new("Empty")));

    let (surface, stats) = paint(&mut notation, RectF::new(0.0, 0.0, 500.0, 500.0));

    assert!(surface.display_list().is_empty());
    assert_eq!(stats.pages_painted, 0);
}

#[test]
fn test_culling_skips_left_pages_and_stops_at_first_right_page() {
    let score = strip_of_pages();
    let log = score.log();
    let mut notation = Notation::with_score(Box::new(score));

    let (_, stats) = paint(&mut notation, RectF::new(150.0, 0.0, 110.0, 100.0));

    assert_eq!(visited_pages(&log), vec![1, 2]);
    assert_eq!(stats.pages_painted, 2);
    assert_eq!(stats.pages_culled, 3);
    assert!(!stats.full_scan);
}

#[test]
fn test_page_touching_visible_edge_is_painted() {
    let score = strip_of_pages();
    let log = score.log();
    let mut notation = Notation::with_score(Box::new(score));

    // Right edge of page 0 and left edge of page 1 both lie on the region
    paint(&mut notation, RectF::new(100.0, 0.0, 10.0, 100.0));

    assert_eq!(visited_pages(&log), vec![0, 1]);
}

#[test]
fn test_unsorted_pages_fall_back_to_full_scan() {
    let score = MockScore::new("Shuffled")
        .page_at(330.0, 100.0)
        .page_at(0.0, 100.0)
        .page_at(110.0, 100.0);
    let log = score.log();
    let mut notation = Notation::with_score(Box::new(score));

    let (_, stats) = paint(&mut notation, RectF::new(0.0, 0.0, 150.0, 100.0));

    assert!(stats.full_scan);
    assert_eq!(visited_pages(&log), vec![1, 2]);
    assert_eq!(stats.pages_culled, 1);
}

#[test]
fn test_line_and_system_modes_paint_first_page_only() {
    for mode in [ViewMode::Line, ViewMode::System] {
        let score = strip_of_pages();
        let log = score.log();
        let mut notation = Notation::with_score(Box::new(score));
        notation.set_view_mode(mode);

        let (surface, stats) = paint(&mut notation, RectF::new(0.0, 0.0, 1000.0, 100.0));

        assert_eq!(visited_pages(&log), vec![0], "mode {}", mode);
        assert_eq!(stats.pages_painted, 1);
        // No borders in continuous modes
        assert_eq!(surface.display_list().count_rects(), 0);
    }
}

#[test]
fn test_page_border_drawn_unless_printing() {
    let mut notation = Notation::with_score(Box::new(MockScore::new("One").page_at(0.0, 100.0)));
    let (surface, _) = paint(&mut notation, RectF::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(surface.display_list().count_rects(), 1);

    let mut printing = MockScore::new("One").page_at(0.0, 100.0);
    printing.printing = true;
    let mut notation = Notation::with_score(Box::new(printing));
    let (surface, _) = paint(&mut notation, RectF::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(surface.display_list().count_rects(), 0);
}

#[test]
fn test_even_page_draws_exactly_one_extra_line() {
    let score = MockScore::new("Spread")
        .page_at(0.0, 100.0)
        .page_at(110.0, 100.0)
        .borders(true);
    let mut notation = Notation::with_score(Box::new(score));

    let (odd, odd_stats) = paint(&mut notation, RectF::new(0.0, 0.0, 105.0, 100.0));
    let (even, even_stats) = paint(&mut notation, RectF::new(105.0, 0.0, 200.0, 100.0));

    assert_eq!(odd_stats.pages_painted, 1);
    assert_eq!(even_stats.pages_painted, 1);
    assert_eq!(odd.display_list().count_lines(), 0);
    assert_eq!(even.display_list().count_lines(), 1);
    // Outer border and margin frame on both
    assert_eq!(odd.display_list().count_rects(), 2);
    assert_eq!(even.display_list().count_rects(), 2);
}

#[test]
fn test_even_page_rule_position() {
    let score = MockScore::new("Spread")
        .page_at(0.0, 100.0)
        .page_at(110.0, 100.0)
        .borders(true);
    let mut notation = Notation::with_score(Box::new(score));

    let (even, _) = paint(&mut notation, RectF::new(105.0, 0.0, 200.0, 100.0));

    let line = even
        .display_list()
        .commands
        .iter()
        .find_map(|command| match command {
            DrawCommand::DrawLine { from, to } => Some((*from, *to)),
            _ => None,
        })
        .unwrap();
    // Inner frame of the page at x=110 with 10 margins ends at x=200
    assert_eq!(line, (PointF::new(200.0, 0.0), PointF::new(200.0, 90.0)));
}

#[test]
fn test_no_margin_frame_without_show_page_borders() {
    let score = MockScore::new("Spread").page_at(0.0, 100.0).page_at(110.0, 100.0);
    let mut notation = Notation::with_score(Box::new(score));

    let (surface, _) = paint(&mut notation, RectF::new(0.0, 0.0, 300.0, 100.0));

    assert_eq!(surface.display_list().count_lines(), 0);
    assert_eq!(surface.display_list().count_rects(), 2);
}

#[test]
fn test_elements_painted_in_order_skipping_invisible() {
    let score = MockScore::new("Notes")
        .page_at(0.0, 100.0)
        .element(PointF::new(10.0, 10.0), true)
        .element(PointF::new(20.0, 10.0), false)
        .element(PointF::new(30.0, 10.0), true);
    let log = score.log();
    let mut notation = Notation::with_score(Box::new(score));

    let (surface, stats) = paint(&mut notation, RectF::new(0.0, 0.0, 100.0, 100.0));

    let drawn: Vec<u64> = drawn_elements(&log).iter().map(|id| id.0).collect();
    assert_eq!(drawn, vec![1, 3]);
    assert_eq!(stats.elements_painted, 2);
    // Every translation is undone
    assert_eq!(surface.display_list().net_translation(), PointF::new(0.0, 0.0));
}

#[test]
fn test_page_background_filled_in_page_coordinates() {
    let mut notation = Notation::with_score(Box::new(strip_of_pages()));

    let (surface, _) = paint(&mut notation, RectF::new(150.0, 0.0, 10.0, 100.0));

    let fills = surface.display_list().fills();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].0, RectF::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(fills[0].1, notation.configuration().page_color);
}

#[test]
fn test_repaint_clears_discovered_elements() {
    let score = MockScore::new("Hits")
        .page_at(0.0, 100.0)
        .element(PointF::new(20.0, 20.0), true);
    let mut notation = Notation::with_score(Box::new(score));

    let hits = notation.hit_test(PointF::new(21.0, 21.0));
    assert_eq!(hits.len(), 1);
    assert!(notation.interaction().is_discovered(hits[0].id));

    paint(&mut notation, RectF::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(notation.interaction().discovered_count(), 0);
}

#[test]
fn test_selection_overlay_painted_after_pages() {
    let score = MockScore::new("Overlay")
        .page_at(0.0, 100.0)
        .element(PointF::new(20.0, 20.0), true);
    let mut notation = Notation::with_score(Box::new(score));
    notation.select_at(PointF::new(22.0, 22.0), notation_wasm::notation::SelectMode::Replace);

    let (surface, _) = paint(&mut notation, RectF::new(0.0, 0.0, 100.0, 100.0));

    let last = surface.display_list().commands.last().cloned();
    assert_eq!(last, Some(DrawCommand::DrawRect { rect: RectF::new(20.0, 20.0, 4.0, 4.0) }));
}

#[test]
fn test_selection_overlay_follows_view_mode_relayout() {
    let mut score = MockScore::new("Reflow")
        .page_at(0.0, 100.0)
        .element(PointF::new(20.0, 20.0), true)
        .page_at(110.0, 100.0);
    score.layout_shift = PointF::new(0.0, 300.0);
    let mut notation = Notation::with_score(Box::new(score));
    notation.select_at(PointF::new(22.0, 22.0), SelectMode::Replace);

    notation.set_view_mode(ViewMode::Float);
    let (surface, _) = paint(&mut notation, RectF::new(0.0, 0.0, 300.0, 500.0));

    let last = surface.display_list().commands.last().cloned();
    assert_eq!(last, Some(DrawCommand::DrawRect { rect: RectF::new(20.0, 320.0, 4.0, 4.0) }));
    assert_eq!(
        notation.interaction().selection().canvas_rect(),
        RectF::new(20.0, 320.0, 4.0, 4.0)
    );
}

#[test]
fn test_pages_not_painted_cannot_be_hit() {
    let score = MockScore::new("Continuous")
        .page_at(0.0, 100.0)
        .page_at(110.0, 100.0)
        .element(PointF::new(20.0, 20.0), true);
    let mut notation = Notation::with_score(Box::new(score));
    assert_eq!(notation.hit_test(PointF::new(131.0, 21.0)).len(), 1);

    notation.set_view_mode(ViewMode::System);

    assert!(notation.hit_test(PointF::new(131.0, 21.0)).is_empty());
    assert_eq!(notation.select_at(PointF::new(131.0, 21.0), SelectMode::Replace), None);
    assert_eq!(notation.select_in_rect(RectF::new(0.0, 0.0, 300.0, 100.0)), 0);
}

#[test]
fn test_switching_to_system_drops_selection_on_hidden_page() {
    let score = MockScore::new("Continuous")
        .page_at(0.0, 100.0)
        .page_at(110.0, 100.0)
        .element(PointF::new(20.0, 20.0), true);
    let mut notation = Notation::with_score(Box::new(score));
    notation.select_at(PointF::new(131.0, 21.0), SelectMode::Replace);
    assert_eq!(notation.interaction().selection().elements.len(), 1);

    notation.set_view_mode(ViewMode::System);
    let (surface, _) = paint(&mut notation, RectF::new(0.0, 0.0, 300.0, 100.0));

    assert!(notation.interaction().selection().is_empty());
    assert_eq!(surface.display_list().count_rects(), 0);
}
