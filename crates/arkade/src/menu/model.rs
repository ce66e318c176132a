use crate::config::MenuConfig;
use crate::mode::Mode;
use crate::smoothing::Spring;
use handmark::Point;
use serde::Serialize;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MenuPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Dragging,
    Closing,
}

/// Maps a drag position to the menu item under it. Inside the dead zone
/// nothing is selected. Angles are clockwise in screen space starting from
/// the positive x axis: 270°..90° through 0° is volume, 90°..180° panning,
/// 180°..270° reverb.
pub fn selected_mode(center: Point, drag: Point, dead_zone: f64) -> Option<Mode> {
    let (dx, dy) = (drag.x - center.x, drag.y - center.y);
    if dx.hypot(dy) < dead_zone {
        return None;
    }

    let degrees = (dy.atan2(dx).to_degrees() + 360.0) % 360.0;
    let mode = if degrees <= 90.0 || degrees >= 270.0 {
        Mode::Volume
    } else if degrees <= 180.0 {
        Mode::Panning
    } else {
        Mode::Reverb
    };
    Some(mode)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemVisual {
    pub mode: Mode,
    pub scale: f64,
}

/// Everything a renderer needs to draw the menu for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuVisual {
    pub phase: MenuPhase,
    pub center: Option<Point>,
    pub drag: Option<Point>,
    /// 0 when closed, 1 when fully open.
    pub radius: f64,
    pub alpha: f64,
    pub selection: Option<Mode>,
    pub items: Vec<ItemVisual>,
}

#[derive(Debug, Clone)]
struct MenuItem {
    mode: Mode,
    scale: Spring,
    grows_at: Option<f64>,
    highlight_until: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RadialMenu {
    phase: MenuPhase,
    center: Option<Point>,
    drag: Option<Point>,
    radius: Spring,
    alpha: Spring,
    items: Vec<MenuItem>,
    close_at: Option<f64>,
    style: MenuConfig,
}

impl RadialMenu {
    pub fn new(style: MenuConfig) -> Self {
        let items = Mode::MENU
            .iter()
            .map(|&mode| MenuItem {
                mode,
                scale: Spring::new(style.item_closed_scale, style.item_spring),
                grows_at: None,
                highlight_until: None,
            })
            .collect();

        Self {
            phase: MenuPhase::Closed,
            center: None,
            drag: None,
            radius: Spring::new(0.0, style.radius_spring),
            alpha: Spring::new(0.0, style.radius_spring),
            items,
            close_at: None,
            style,
        }
    }

    pub fn set_style(&mut self, style: MenuConfig) {
        self.radius.set_params(style.radius_spring);
        self.alpha.set_params(style.radius_spring);
        for item in &mut self.items {
            item.scale.set_params(style.item_spring);
        }
        self.style = style;
    }

    /// Opens at `center`. Refused while already open; a closing menu can be
    /// reopened.
    pub fn open(&mut self, center: Point, now: f64) -> bool {
        if self.is_open() {
            return false;
        }

        log::debug!("Menu opening at ({:.0}, {:.0})", center.x, center.y);
        self.phase = MenuPhase::Opening;
        self.center = Some(center);
        self.drag = None;
        self.close_at = None;
        self.radius.set_target(1.0);
        self.alpha.set_target(1.0);

        let stagger = self.style.stagger_ms;
        for (i, item) in self.items.iter_mut().enumerate() {
            item.grows_at = Some(now + i as f64 * stagger);
            item.highlight_until = None;
        }
        self.refresh_items(now);
        true
    }

    pub fn drag_to(&mut self, position: Point, now: f64) {
        if !self.is_open() {
            return;
        }
        self.drag = Some(position);
        if self.phase == MenuPhase::Open {
            self.phase = MenuPhase::Dragging;
        }
        self.refresh_items(now);
    }

    /// Ends a drag. Returns the selected mode, if any, and closes the menu
    /// after the configured release delay.
    pub fn release(&mut self, now: f64) -> Option<Mode> {
        if !self.is_open() {
            return None;
        }

        let selection = self.selection();
        if let Some(mode) = selection
            && self.style.highlight_ms > 0.0
            && let Some(item) = self.items.iter_mut().find(|i| i.mode == mode)
        {
            item.highlight_until = Some(now + self.style.highlight_ms);
        }
        self.refresh_items(now);

        if self.style.release_close_delay_ms > 0.0 {
            self.close_at = Some(now + self.style.release_close_delay_ms);
        } else {
            self.close();
        }
        selection
    }

    pub fn close(&mut self) {
        if matches!(self.phase, MenuPhase::Closed | MenuPhase::Closing) {
            return;
        }

        log::debug!("Menu closing");
        self.phase = MenuPhase::Closing;
        self.close_at = None;
        self.radius.set_target(0.0);
        self.alpha.set_target(0.0);
        for item in &mut self.items {
            item.grows_at = None;
            item.highlight_until = None;
            item.scale.set_target(self.style.item_closed_scale);
        }
    }

    /// Advances deadlines and springs by one frame. Returns the new phase
    /// when it changed.
    pub fn update(&mut self, now: f64) -> Option<MenuPhase> {
        let before = self.phase;

        if let Some(at) = self.close_at
            && now >= at
        {
            self.close();
        }
        self.refresh_items(now);

        self.radius.update();
        self.alpha.update();
        for item in &mut self.items {
            item.scale.update();
        }

        let settled = self.radius.is_at_rest() && self.alpha.is_at_rest();
        match self.phase {
            MenuPhase::Opening if settled && self.radius.target() == 1.0 => {
                self.phase = if self.drag.is_some() {
                    MenuPhase::Dragging
                } else {
                    MenuPhase::Open
                };
            }
            MenuPhase::Closing if settled && self.radius.target() == 0.0 => {
                log::debug!("Menu closed");
                self.phase = MenuPhase::Closed;
                self.center = None;
                self.drag = None;
            }
            _ => {}
        }

        (self.phase != before).then_some(self.phase)
    }

    fn refresh_items(&mut self, now: f64) {
        if !self.is_open() {
            return;
        }
        let selection = self.selection();
        let style = &self.style;

        for item in &mut self.items {
            if let Some(at) = item.grows_at {
                if now < at {
                    continue;
                }
                item.grows_at = None;
            }

            let target = match item.highlight_until {
                Some(until) if now < until => style.highlight_scale,
                _ => {
                    item.highlight_until = None;
                    if selection == Some(item.mode) {
                        style.item_hover_scale
                    } else {
                        style.item_open_scale
                    }
                }
            };
            item.scale.set_target(target);
        }
    }

    pub fn selection(&self) -> Option<Mode> {
        let (center, drag) = (self.center?, self.drag?);
        selected_mode(center, drag, self.style.dead_zone_px)
    }

    pub fn phase(&self) -> MenuPhase {
        self.phase
    }

    /// Opening, open or dragging.
    pub fn is_open(&self) -> bool {
        matches!(
            self.phase,
            MenuPhase::Opening | MenuPhase::Open | MenuPhase::Dragging
        )
    }

    /// Anything but fully closed.
    pub fn is_active(&self) -> bool {
        self.phase != MenuPhase::Closed
    }

    pub fn center(&self) -> Option<Point> {
        self.center
    }

    pub fn visual(&self) -> MenuVisual {
        MenuVisual {
            phase: self.phase,
            center: self.center,
            drag: self.drag,
            radius: self.radius.value(),
            alpha: self.alpha.value(),
            selection: self.selection(),
            items: self
                .items
                .iter()
                .map(|i| ItemVisual {
                    mode: i.mode,
                    scale: i.scale.value(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Profile};

    const CENTER: Point = Point { x: 500.0, y: 500.0 };

    fn at_angle(degrees: f64, distance: f64) -> Point {
        let rad = degrees.to_radians();
        Point::new(
            CENTER.x + distance * rad.cos(),
            CENTER.y + distance * rad.sin(),
        )
    }

    fn menu(profile: Profile) -> RadialMenu {
        RadialMenu::new(Config::preset(profile).menu)
    }

    fn run_until_phase(menu: &mut RadialMenu, phase: MenuPhase, from: f64) -> f64 {
        let mut now = from;
        for _ in 0..1000 {
            now += 16.0;
            menu.update(now);
            if menu.phase() == phase {
                return now;
            }
        }
        panic!("menu never reached {phase}");
    }

    #[test]
    fn test_selection_sectors() {
        let cases = [
            (0.0, Some(Mode::Volume)),
            (45.0, Some(Mode::Volume)),
            (89.0, Some(Mode::Volume)),
            (91.0, Some(Mode::Panning)),
            (100.0, Some(Mode::Panning)),
            (200.0, Some(Mode::Reverb)),
            (269.0, Some(Mode::Reverb)),
            (271.0, Some(Mode::Volume)),
            (359.0, Some(Mode::Volume)),
        ];
        for (degrees, expected) in cases {
            assert_eq!(
                selected_mode(CENTER, at_angle(degrees, 150.0), 80.0),
                expected,
                "at {degrees}°"
            );
        }
    }

    #[test]
    fn test_dead_zone() {
        assert_eq!(selected_mode(CENTER, at_angle(100.0, 79.0), 80.0), None);
        assert_eq!(
            selected_mode(CENTER, at_angle(100.0, 81.0), 80.0),
            Some(Mode::Panning)
        );
        assert_eq!(selected_mode(CENTER, CENTER, 80.0), None);
    }

    #[test]
    fn test_open_drag_release_close() {
        let mut menu = menu(Profile::Main);
        assert!(menu.open(CENTER, 0.0));
        assert!(!menu.open(Point::new(0.0, 0.0), 1.0));
        assert_eq!(menu.center(), Some(CENTER));

        let now = run_until_phase(&mut menu, MenuPhase::Open, 0.0);
        menu.drag_to(at_angle(200.0, 120.0), now);
        assert_eq!(menu.phase(), MenuPhase::Dragging);
        assert_eq!(menu.selection(), Some(Mode::Reverb));

        assert_eq!(menu.release(now), Some(Mode::Reverb));
        assert_eq!(menu.phase(), MenuPhase::Closing);
        assert!(menu.is_active());

        run_until_phase(&mut menu, MenuPhase::Closed, now);
        assert_eq!(menu.center(), None);
        assert_eq!(menu.visual().radius, 0.0);
    }

    #[test]
    fn test_release_in_dead_zone_selects_nothing() {
        let mut menu = menu(Profile::Main);
        menu.open(CENTER, 0.0);
        menu.drag_to(at_angle(0.0, 10.0), 16.0);
        assert_eq!(menu.release(32.0), None);
        assert_eq!(menu.phase(), MenuPhase::Closing);
    }

    #[test]
    fn test_items_stagger_in() {
        let mut menu = menu(Profile::Main);
        menu.open(CENTER, 0.0);
        menu.update(16.0);
        let scales: Vec<f64> = menu.visual().items.iter().map(|i| i.scale).collect();
        assert!(scales[0] > 0.0);
        assert_eq!(scales[1], 0.0);
        assert_eq!(scales[2], 0.0);

        menu.update(60.0);
        let scales: Vec<f64> = menu.visual().items.iter().map(|i| i.scale).collect();
        assert!(scales[1] > 0.0);
        assert_eq!(scales[2], 0.0);
    }

    #[test]
    fn test_delayed_close_after_release() {
        let mut menu = menu(Profile::Onboarding);
        menu.open(CENTER, 0.0);
        menu.drag_to(at_angle(120.0, 150.0), 10.0);
        assert_eq!(menu.release(100.0), Some(Mode::Panning));
        assert!(menu.is_open());

        menu.update(299.0);
        assert!(menu.is_open());
        assert_eq!(menu.update(300.0), Some(MenuPhase::Closing));
    }

    #[test]
    fn test_hover_and_highlight_scales() {
        let mut menu = menu(Profile::Onboarding);
        menu.open(CENTER, 0.0);
        menu.drag_to(at_angle(120.0, 150.0), 0.0);
        for t in 1..300 {
            menu.update(t as f64);
        }
        let panning = &menu.visual().items[2];
        assert_eq!(panning.mode, Mode::Panning);
        assert!((panning.scale - 1.1).abs() < 0.01, "got {}", panning.scale);

        menu.release(300.0);
        menu.update(301.0);
        assert_eq!(menu.items[2].scale.target(), 1.2);
        // highlight over, close still pending
        menu.update(460.0);
        assert_eq!(menu.items[2].scale.target(), 1.1);
        assert!(menu.is_open());
    }

    #[test]
    fn test_reopen_while_closing() {
        let mut menu = menu(Profile::Main);
        menu.open(CENTER, 0.0);
        menu.update(16.0);
        menu.close();
        assert!(menu.open(Point::new(100.0, 100.0), 32.0));
        assert_eq!(menu.phase(), MenuPhase::Opening);
        assert_eq!(menu.center(), Some(Point::new(100.0, 100.0)));
    }
}
