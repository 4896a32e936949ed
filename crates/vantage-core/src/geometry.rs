/// Axis-aligned rectangle in document pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn area(&self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Rect {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        })
    }
}

/// Vertical extent of a page element: `offsetTop` and `offsetHeight`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            height: height.max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Full-width rect so the ratio math only depends on the vertical axis.
    pub fn as_rect(&self, width: f64) -> Rect {
        Rect {
            x: 0.0,
            y: self.top,
            w: width,
            h: self.height,
        }
    }
}

/// What the browser window currently shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_y,
            width,
            height,
        }
    }

    /// The observer root after applying a negative bottom margin.
    pub fn root_rect(&self, margin_bottom: f64) -> Rect {
        Rect {
            x: 0.0,
            y: self.scroll_y,
            w: self.width,
            h: (self.height - margin_bottom).max(0.0),
        }
    }

    /// Same contract as `IntersectionObserverEntry.intersectionRatio`.
    pub fn intersection_ratio(&self, target: Bounds, margin_bottom: f64) -> f64 {
        let root = self.root_rect(margin_bottom);
        let rect = target.as_rect(self.width);
        let Some(hit) = rect.intersect(&root) else {
            return 0.0;
        };
        let area = rect.area();
        if area <= 0.0 {
            // zero-height targets count as fully visible once they touch the root
            return 1.0;
        }
        (hit.area() / area).clamp(0.0, 1.0)
    }
}

/// CSS transform values the site writes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    TranslateY(f64),
    TranslateYPercent(f64),
    Scale(f64),
    /// Horizontally centred overlay shifted vertically, used by toasts.
    CenteredX { dy: f64 },
}

impl Transform {
    pub fn to_css(&self) -> String {
        match *self {
            Transform::TranslateY(px) => format!("translateY({}px)", px_value(px)),
            Transform::TranslateYPercent(p) => format!("translateY({}%)", px_value(p)),
            Transform::Scale(s) => format!("scale({})", px_value(s)),
            Transform::CenteredX { dy } => {
                format!("translateX(-50%) translateY({}px)", px_value(dy))
            }
        }
    }
}

// Keeps `-0` out of generated CSS.
fn px_value(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}
