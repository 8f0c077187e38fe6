//! Pointer events emitted by the chart for hover/click interaction

use crate::errors::{WidgetError, WidgetResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Hover,
    Click,
}

/// One trace point under the pointer, as reported by the chart
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    /// Date label on the x axis, e.g. `"1987-01-01"`
    pub x: String,
    pub y: Option<f64>,
    pub curve_number: usize,
}

impl ChartPoint {
    pub fn new(x: impl Into<String>, y: Option<f64>, curve_number: usize) -> Self {
        Self {
            x: x.into(),
            y,
            curve_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub points: Vec<ChartPoint>,
    /// Pointer x in container pixels, when the chart could resolve it
    pub pixel_x: Option<f64>,
}

impl PointerEvent {
    pub fn hover(points: Vec<ChartPoint>, pixel_x: Option<f64>) -> Self {
        Self {
            kind: PointerKind::Hover,
            points,
            pixel_x,
        }
    }

    pub fn click(points: Vec<ChartPoint>, pixel_x: Option<f64>) -> Self {
        Self {
            kind: PointerKind::Click,
            points,
            pixel_x,
        }
    }

    pub fn is_click(&self) -> bool {
        self.kind == PointerKind::Click
    }

    /// Year under the pointer.
    ///
    /// With all three traces hovered the third point (higher emissions) has
    /// the authoritative label; otherwise the first point is used.
    pub fn year(&self) -> WidgetResult<i32> {
        let point = if self.points.len() > 2 {
            &self.points[2]
        } else {
            self.points
                .first()
                .ok_or_else(|| WidgetError::data_shape("pointer event carries no points"))?
        };

        point
            .x
            .get(..4)
            .and_then(|prefix| prefix.parse::<i32>().ok())
            .ok_or_else(|| {
                WidgetError::data_shape(format!("cannot read a year from x label '{}'", point.x))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_single_point() {
        let event = PointerEvent::hover(vec![ChartPoint::new("1987-01-01", Some(3.0), 0)], None);
        assert_eq!(event.year().unwrap(), 1987);
    }

    #[test]
    fn test_year_prefers_third_point() {
        let event = PointerEvent::click(
            vec![
                ChartPoint::new("2040-01-01", Some(1.0), 0),
                ChartPoint::new("2040-01-01", Some(20.0), 1),
                ChartPoint::new("2041-01-01", Some(40.0), 2),
            ],
            Some(320.0),
        );
        assert_eq!(event.year().unwrap(), 2041);
        assert!(event.is_click());
    }

    #[test]
    fn test_year_errors() {
        assert!(PointerEvent::hover(vec![], None).year().is_err());
        let event = PointerEvent::hover(vec![ChartPoint::new("19", None, 0)], None);
        assert!(matches!(event.year(), Err(WidgetError::DataShape { .. })));
    }
}
