//! The per-dimension pieces of a keyer.
//!
//! Each part pulls one field out of a `View`, maps it to an integer cell, and for a given search
//! radius reports every cell that a matching view's field could fall in.

use serde::{Deserialize, Serialize};

use crate::criteria::{DirectionCriterion, MatchCriteria};
use crate::error::{Error, Result};
use crate::layout::CellIndex;
use crate::view::{Direction, View};

const FULL_TURN: f32 = 360.0;

/// Inclusive range of cells.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CellRange {
    pub first: CellIndex,
    pub last: CellIndex,
}

impl CellRange {

    pub fn new(first: CellIndex, last: CellIndex) -> Self {

        debug_assert!(first <= last);
        return Self { first, last };
    }

    pub fn single(cell: CellIndex) -> Self {
        return Self { first: cell, last: cell };
    }

    pub fn len(&self) -> usize {
        return (self.last as i32 - self.first as i32 + 1) as usize;
    }

    pub fn contains(&self, cell: CellIndex) -> bool {
        return self.first <= cell && cell <= self.last;
    }
}

/// The cells a part can match within: one range, or two disjoint ones when an angular range
/// crosses the wrap point. The second range, if present, lies entirely above the first.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseCells {
    pub first: CellRange,
    pub second: Option<CellRange>,
}

impl CloseCells {

    pub fn one(range: CellRange) -> Self {
        return Self { first: range, second: None };
    }

    pub fn two(lower: CellRange, upper: CellRange) -> Self {

        debug_assert!(lower.last < upper.first);
        return Self { first: lower, second: Some(upper) };
    }

    pub fn num_cells(&self) -> usize {

        let second_len = self.second.map(|r| r.len()).unwrap_or(0);
        return self.first.len() + second_len;
    }

    pub fn contains(&self, cell: CellIndex) -> bool {

        return self.first.contains(cell) || self.second.map(|r| r.contains(cell)).unwrap_or(false);
    }

    /// The `position`th cell in ascending order. Panics if `position >= num_cells()`.
    pub fn nth_cell(&self, position: usize) -> CellIndex {

        // ranges can be longer than CellIndex::MAX, so step in i32
        let offset = |range: &CellRange, position: usize| (range.first as i32 + position as i32) as CellIndex;

        let first_len = self.first.len();
        if position < first_len {
            return offset(&self.first, position);
        }

        match self.second {
            Some(second) if position - first_len < second.len() => {
                return offset(&second, position - first_len);
            },
            _ => panic!("Cell position {} out of range for {:?}", position, self),
        }
    }

    pub fn min_cell(&self) -> CellIndex {
        return self.first.first;
    }

    pub fn max_cell(&self) -> CellIndex {
        return self.second.unwrap_or(self.first).last;
    }
}

pub trait KeyerPart {
    type Value: Copy;
    type Radius: Copy;

    fn name(&self) -> &'static str;

    fn extract(&self, view: &View) -> Self::Value;

    fn discretize(&self, value: Self::Value) -> CellIndex;

    fn search_radius(&self, criteria: &MatchCriteria) -> Self::Radius;

    /// Every cell whose values could be within `radius` of `value`. Always contains
    /// `discretize(value)`.
    fn close_cells(&self, value: Self::Value, radius: Self::Radius) -> CloseCells;
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum AngleField {
    FromPhi,
    FromPsi,
    ToPhi,
    ToPsi,
}

/// A backbone angle, cut into equal cells starting at `-180 + start_offset` and wrapping at a
/// full turn. If the cell width does not divide 360, the last cell is narrower.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct AnglePart {
    field: AngleField,
    cell_width: f32,
    start_offset: f32,
    num_cells: CellIndex,
}

impl AnglePart {

    pub fn new(field: AngleField, cell_width: f32, start_offset: f32) -> Result<Self> {

        if !cell_width.is_finite() || cell_width <= 0.0 {
            return Err(Error::Config(format!("angle cell width must be positive, got {}", cell_width)));
        }
        if !start_offset.is_finite() {
            return Err(Error::Config(format!("angle start offset must be finite, got {}", start_offset)));
        }

        let num_cells = (FULL_TURN / cell_width).ceil();
        if num_cells > CellIndex::MAX as f32 {
            return Err(Error::Config(format!("angle cell width {} gives too many cells", cell_width)));
        }

        return Ok(Self {
            field,
            cell_width,
            start_offset,
            num_cells: num_cells as CellIndex,
        });
    }

    pub fn field(&self) -> AngleField {
        return self.field;
    }

    pub fn num_cells(&self) -> CellIndex {
        return self.num_cells;
    }

    fn origin(&self) -> f32 {
        return -180.0 + self.start_offset;
    }

    /// Distance round from the origin, in `[0, 360]`.
    fn unwrapped(&self, value: f32) -> f32 {
        return (value - self.origin()).rem_euclid(FULL_TURN);
    }

    fn cell_of_unwrapped(&self, unwrapped: f32) -> CellIndex {

        let cell = (unwrapped / self.cell_width).floor().max(0.0) as CellIndex;
        return cell.min(self.num_cells - 1);
    }

    fn all_cells(&self) -> CloseCells {
        return CloseCells::one(CellRange::new(0, self.num_cells - 1));
    }
}

impl KeyerPart for AnglePart {
    type Value = f32;
    type Radius = f32;

    fn name(&self) -> &'static str {

        match self.field {
            AngleField::FromPhi => "from_phi",
            AngleField::FromPsi => "from_psi",
            AngleField::ToPhi => "to_phi",
            AngleField::ToPsi => "to_psi",
        }
    }

    fn extract(&self, view: &View) -> f32 {

        match self.field {
            AngleField::FromPhi => view.from_phi,
            AngleField::FromPsi => view.from_psi,
            AngleField::ToPhi => view.to_phi,
            AngleField::ToPsi => view.to_psi,
        }
    }

    fn discretize(&self, value: f32) -> CellIndex {
        return self.cell_of_unwrapped(self.unwrapped(value));
    }

    fn search_radius(&self, criteria: &MatchCriteria) -> f32 {

        match self.field {
            AngleField::FromPhi | AngleField::ToPhi => criteria.maximum_phi_angle_difference(),
            AngleField::FromPsi | AngleField::ToPsi => criteria.maximum_psi_angle_difference(),
        }
    }

    fn close_cells(&self, value: f32, radius: f32) -> CloseCells {

        if 2.0 * radius >= FULL_TURN {
            return self.all_cells();
        }

        let unwrapped = self.unwrapped(value);
        let low = unwrapped - radius;
        let high = unwrapped + radius;

        let (low_cell, high_cell) = if low < 0.0 {
            (self.cell_of_unwrapped(low + FULL_TURN), self.cell_of_unwrapped(high))
        } else if high >= FULL_TURN {
            (self.cell_of_unwrapped(low), self.cell_of_unwrapped(high - FULL_TURN))
        } else {
            return CloseCells::one(CellRange::new(self.cell_of_unwrapped(low), self.cell_of_unwrapped(high)));
        };

        // the range crosses the wrap point: [0, high_cell] and [low_cell, last]
        if high_cell + 1 >= low_cell {
            return self.all_cells();
        }

        return CloseCells::two(CellRange::new(0, high_cell), CellRange::new(low_cell, self.num_cells - 1));
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum ViewAxis {
    X,
    Y,
    Z,
}

/// One component of the view vector, cut into equal cells from zero with no wrap. Cells beyond
/// the representable range clamp to the end cells.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct AxisPart {
    axis: ViewAxis,
    cell_width: f32,
}

impl AxisPart {

    pub fn new(axis: ViewAxis, cell_width: f32) -> Result<Self> {

        if !cell_width.is_finite() || cell_width <= 0.0 {
            return Err(Error::Config(format!("axis cell width must be positive, got {}", cell_width)));
        }

        return Ok(Self { axis, cell_width });
    }

    pub fn axis(&self) -> ViewAxis {
        return self.axis;
    }
}

impl KeyerPart for AxisPart {
    type Value = f32;
    type Radius = f32;

    fn name(&self) -> &'static str {

        match self.axis {
            ViewAxis::X => "view_x",
            ViewAxis::Y => "view_y",
            ViewAxis::Z => "view_z",
        }
    }

    fn extract(&self, view: &View) -> f32 {

        match self.axis {
            ViewAxis::X => view.view_vector.x,
            ViewAxis::Y => view.view_vector.y,
            ViewAxis::Z => view.view_vector.z,
        }
    }

    fn discretize(&self, value: f32) -> CellIndex {

        let cell = (value / self.cell_width).floor();
        return cell.clamp(CellIndex::MIN as f32, CellIndex::MAX as f32) as CellIndex;
    }

    fn search_radius(&self, criteria: &MatchCriteria) -> f32 {
        return criteria.maximum_distance();
    }

    fn close_cells(&self, value: f32, radius: f32) -> CloseCells {
        return CloseCells::one(CellRange::new(self.discretize(value - radius), self.discretize(value + radius)));
    }
}

/// Chain direction as a two-cell dimension: 0 for increasing, 1 for decreasing.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct DirectionPart;

impl KeyerPart for DirectionPart {
    type Value = Direction;
    type Radius = DirectionCriterion;

    fn name(&self) -> &'static str {
        return "direction";
    }

    fn extract(&self, view: &View) -> Direction {
        return view.direction;
    }

    fn discretize(&self, value: Direction) -> CellIndex {

        match value {
            Direction::Increasing => 0,
            Direction::Decreasing => 1,
        }
    }

    fn search_radius(&self, criteria: &MatchCriteria) -> DirectionCriterion {
        return criteria.direction_criterion();
    }

    fn close_cells(&self, value: Direction, radius: DirectionCriterion) -> CloseCells {

        match radius {
            DirectionCriterion::MustMatch => CloseCells::one(CellRange::single(self.discretize(value))),
            DirectionCriterion::NeedNotMatch => CloseCells::one(CellRange::new(0, 1)),
        }
    }
}

/// The closed set of parts a keyer can be built from.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum KeyerPartKind {
    Angle(AnglePart),
    Axis(AxisPart),
    Direction(DirectionPart),
}

impl KeyerPartKind {

    pub fn name(&self) -> &'static str {

        match self {
            KeyerPartKind::Angle(part) => part.name(),
            KeyerPartKind::Axis(part) => part.name(),
            KeyerPartKind::Direction(part) => part.name(),
        }
    }

    pub fn cell_of_view(&self, view: &View) -> CellIndex {

        match self {
            KeyerPartKind::Angle(part) => part.discretize(part.extract(view)),
            KeyerPartKind::Axis(part) => part.discretize(part.extract(view)),
            KeyerPartKind::Direction(part) => part.discretize(part.extract(view)),
        }
    }

    pub fn close_cells_of_view(&self, view: &View, criteria: &MatchCriteria) -> CloseCells {

        match self {
            KeyerPartKind::Angle(part) => part.close_cells(part.extract(view), criteria.radius_for(part)),
            KeyerPartKind::Axis(part) => part.close_cells(part.extract(view), criteria.radius_for(part)),
            KeyerPartKind::Direction(part) => part.close_cells(part.extract(view), criteria.radius_for(part)),
        }
    }
}
