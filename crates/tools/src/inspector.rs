use serde::Serialize;
use wavefield_field::BoxField;

/// Field inspector for developer tooling.
///
/// Provides read-only queries against the field state for the overlay,
/// the CLI and logging.
pub struct FieldInspector;

impl FieldInspector {
    /// Produce a summary of the field state.
    pub fn summary(field: &BoxField) -> FieldSummary {
        let (min_height, max_height) = field.height_range();
        FieldSummary {
            frame: field.frame(),
            phase: field.phase(),
            root_yaw: field.root_yaw(),
            box_count: field.len(),
            min_height,
            max_height,
        }
    }

    /// Height and color of one box by row-major index.
    pub fn inspect_box(field: &BoxField, index: usize) -> Option<BoxInfo> {
        field.cells().get(index).map(|cell| BoxInfo {
            index,
            position: [cell.base.x, cell.height, cell.base.z],
            color: cell.color.to_ints().map(|c| c.round() as u8),
        })
    }
}

/// Summary of field state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub frame: u64,
    pub phase: f32,
    pub root_yaw: f32,
    pub box_count: usize,
    pub min_height: f32,
    pub max_height: f32,
}

impl std::fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field: frame={} phase={:.3} yaw={:.3} boxes={} height=[{:.3}, {:.3}]",
            self.frame, self.phase, self.root_yaw, self.box_count, self.min_height, self.max_height
        )
    }
}

/// Detailed info about a single box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxInfo {
    pub index: usize,
    /// Field-local position including the current height.
    pub position: [f32; 3],
    /// 0-255 color.
    pub color: [u8; 3],
}

impl std::fmt::Display for BoxInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Box [{}] pos=({:.2}, {:.2}, {:.2}) rgb=({}, {}, {})",
            self.index,
            self.position[0],
            self.position[1],
            self.position[2],
            self.color[0],
            self.color[1],
            self.color[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavefield_field::FieldParams;

    #[test]
    fn summary_fresh_field() {
        let field = BoxField::new(FieldParams::default()).unwrap();
        let summary = FieldInspector::summary(&field);
        assert_eq!(summary.frame, 0);
        assert_eq!(summary.box_count, 576);
        assert!(summary.min_height <= summary.max_height);
    }

    #[test]
    fn summary_after_steps() {
        let mut field = BoxField::new(FieldParams::default()).unwrap();
        field.advance(3);
        let summary = FieldInspector::summary(&field);
        assert_eq!(summary.frame, 3);
        assert!(summary.root_yaw > 0.0);
    }

    #[test]
    fn inspect_box_found() {
        let field = BoxField::new(FieldParams::default()).unwrap();
        let info = FieldInspector::inspect_box(&field, 0).unwrap();
        assert!((info.position[0] + 4.6).abs() < 1e-5);
        assert!((info.position[2] + 4.6).abs() < 1e-5);
    }

    #[test]
    fn box_info_display() {
        let mut field = BoxField::new(FieldParams::default()).unwrap();
        field.advance(10);
        let info = FieldInspector::inspect_box(&field, 575).unwrap();
        let text = format!("{info}");
        assert!(text.starts_with("Box [575] pos=(4.60, "));
        assert!(text.contains("rgb=("));
    }

    #[test]
    fn inspect_box_out_of_range() {
        let field = BoxField::new(FieldParams::default()).unwrap();
        assert!(FieldInspector::inspect_box(&field, 10_000).is_none());
    }

    #[test]
    fn summary_display_and_json() {
        let field = BoxField::new(FieldParams::default()).unwrap();
        let summary = FieldInspector::summary(&field);
        assert!(format!("{summary}").contains("frame=0"));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["box_count"], 576);
    }
}
