//! Page painting pipeline
//!
//! Pages are drawn in layout order with per-page culling against the
//! visible region, then each page's elements in engine order.

use crate::config::NotationConfiguration;
use crate::engine::{Element, Page, ScoreEngine};
use crate::models::{Brush, PointF, RectF, ViewMode};
use crate::renderers::surface::Surface;

use super::interaction::NotationInteraction;

/// Which pages to draw and whether to frame them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagePolicy {
    pub first_page_only: bool,
    pub borders: bool,
}

impl PagePolicy {
    pub fn for_mode(mode: ViewMode, printing: bool) -> Self {
        match mode {
            ViewMode::Line | ViewMode::System => PagePolicy {
                first_page_only: true,
                borders: false,
            },
            ViewMode::Float | ViewMode::Page => PagePolicy {
                first_page_only: false,
                borders: !printing,
            },
        }
    }
}

/// Pages shown in the current view mode, in layout order
///
/// Hit-testing uses the same subset as painting, so nothing on an undrawn
/// page can be selected.
pub(crate) fn shown_pages(score: &dyn ScoreEngine) -> Vec<&dyn Page> {
    let mut pages = score.pages();
    if PagePolicy::for_mode(score.layout_mode(), score.printing()).first_page_only {
        pages.truncate(1);
    }
    pages
}

/// Counters describing what a paint pass did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub pages_painted: usize,
    pub pages_culled: usize,
    pub elements_painted: usize,
    /// The page order could not be trusted for early exit
    pub full_scan: bool,
}

/// Draws one score onto a surface
pub(crate) struct PagePainter<'a> {
    pub score: &'a dyn ScoreEngine,
    pub config: &'a NotationConfiguration,
    pub interaction: &'a mut NotationInteraction,
}

impl PagePainter<'_> {
    pub fn paint(&mut self, surface: &mut dyn Surface, visible: RectF) -> PaintStats {
        let mut stats = PaintStats::default();

        let score = self.score;
        let pages = score.pages();
        if pages.is_empty() {
            return stats;
        }

        let policy = PagePolicy::for_mode(score.layout_mode(), score.printing());
        let pages: &[&dyn Page] = if policy.first_page_only { &pages[..1] } else { &pages };

        self.paint_pages(surface, visible, pages, policy.borders, &mut stats);
        self.interaction.paint(score, surface, self.config);

        stats
    }

    fn paint_pages(
        &mut self,
        surface: &mut dyn Surface,
        visible: RectF,
        pages: &[&dyn Page],
        paint_borders: bool,
        stats: &mut PaintStats,
    ) {
        // Early exit assumes pages are laid out left to right
        let ordered = pages.windows(2).all(|pair| {
            pair[0].canvas_bounding_rect().left() <= pair[1].canvas_bounding_rect().left()
        });
        if !ordered {
            log::warn!("Pages are not in left-to-right order; painting with a full scan");
            stats.full_scan = true;
        }

        for page in pages {
            let page_rect = page.canvas_bounding_rect();

            if page_rect.right() < visible.left() {
                stats.pages_culled += 1;
                continue;
            }

            if page_rect.left() > visible.right() {
                if ordered {
                    stats.pages_culled += pages.len() - stats.pages_painted - stats.pages_culled;
                    break;
                }
                stats.pages_culled += 1;
                continue;
            }

            if paint_borders {
                self.paint_page_border(surface, *page);
            }

            let page_position = page.pos();
            surface.translate(page_position);
            surface.fill_rect(page.bbox(), self.config.page_color);
            stats.elements_painted += self.paint_elements(surface, &page.elements());
            surface.translate(-page_position);

            stats.pages_painted += 1;
        }
    }

    fn paint_page_border(&self, surface: &mut dyn Surface, page: &dyn Page) {
        let bounding_rect = page.canvas_bounding_rect();

        surface.set_brush(Brush::None);
        surface.set_pen(self.config.border_pen());
        surface.draw_rect(bounding_rect);

        if !self.score.show_page_borders() {
            return;
        }

        surface.set_brush(Brush::None);
        surface.set_pen(self.config.frame_margin_pen());
        let inner = bounding_rect.inset(&page.margins());
        surface.draw_rect(inner);

        // Verso pages get a rule at the right margin
        if !page.is_odd() {
            surface.draw_line(
                PointF::new(inner.right(), 0.0),
                PointF::new(inner.right(), inner.bottom()),
            );
        }
    }

    fn paint_elements(&mut self, surface: &mut dyn Surface, elements: &[&dyn Element]) -> usize {
        let mut painted = 0;
        for element in elements {
            if !element.visible() {
                continue;
            }

            self.interaction.forget_discovered(element.id());
            let element_position = element.page_pos();

            surface.translate(element_position);
            element.draw(surface);
            surface.translate(-element_position);

            painted += 1;
        }
        painted
    }
}
