use serde::{Deserialize, Serialize};

use crate::criteria::MatchCriteria;
use crate::cross::CrossKeys;
use crate::error::{Error, Result};
use crate::keyer_part::{AngleField, AnglePart, AxisPart, CloseCells, DirectionPart, KeyerPartKind, ViewAxis};
use crate::layout::{pack_cells, unpack_cells, CellIndex, PackedKey, MAX_KEY_PARTS};
use crate::view::View;

pub const STANDARD_KEY_PARTS: usize = 8;

/// One cell per keyer part.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Key<const N: usize>(pub [CellIndex; N]);

impl<const N: usize> Key<N> {

    pub fn pack(&self) -> PackedKey {
        return pack_cells(&self.0);
    }

    pub fn unpack(packed: PackedKey) -> Self {

        let mut cells = [0 as CellIndex; N];
        unpack_cells(packed, &mut cells);
        return Self(cells);
    }
}

/// The close cells of every part: the set of keys is their cross product.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseKeyRanges<const N: usize>(pub [CloseCells; N]);

impl<const N: usize> CloseKeyRanges<N> {

    /// Lazily enumerates every key in the cross product. Each call starts from the beginning.
    pub fn cross(&self) -> CrossKeys<N> {
        return CrossKeys::new(*self);
    }

    pub fn num_keys(&self) -> usize {
        return self.0.iter().fold(1usize, |acc, cells| acc.saturating_mul(cells.num_cells()));
    }

    pub fn contains(&self, key: &Key<N>) -> bool {
        return self.0.iter().zip(key.0.iter()).all(|(cells, cell)| cells.contains(*cell));
    }

    pub fn min_key(&self) -> Key<N> {
        return Key(std::array::from_fn(|i| self.0[i].min_cell()));
    }

    pub fn max_key(&self) -> Key<N> {
        return Key(std::array::from_fn(|i| self.0[i].max_cell()));
    }
}

/// Turns views into keys, one cell per part.
#[derive(Debug, PartialEq, Clone)]
pub struct Keyer<const N: usize> {
    parts: [KeyerPartKind; N],
}

impl<const N: usize> Keyer<N> {

    pub fn new(parts: [KeyerPartKind; N]) -> Result<Self> {

        if N == 0 {
            return Err(Error::Config("a keyer needs at least one part".to_string()));
        }
        if N > MAX_KEY_PARTS {
            return Err(Error::Config(format!("a keyer can have at most {} parts, got {}", MAX_KEY_PARTS, N)));
        }

        return Ok(Self { parts });
    }

    pub fn parts(&self) -> &[KeyerPartKind; N] {
        return &self.parts;
    }

    pub fn part_names(&self) -> Vec<&'static str> {
        return self.parts.iter().map(|part| part.name()).collect();
    }

    pub fn make_key(&self, view: &View) -> Key<N> {
        return Key(std::array::from_fn(|i| self.parts[i].cell_of_view(view)));
    }

    pub fn make_close_keys(&self, view: &View, criteria: &MatchCriteria) -> CloseKeyRanges<N> {
        return CloseKeyRanges(std::array::from_fn(|i| self.parts[i].close_cells_of_view(view, criteria)));
    }

    pub fn make_min_close_key(&self, view: &View, criteria: &MatchCriteria) -> Key<N> {
        return self.make_close_keys(view, criteria).min_key();
    }

    pub fn make_max_close_key(&self, view: &View, criteria: &MatchCriteria) -> Key<N> {
        return self.make_close_keys(view, criteria).max_key();
    }
}

impl Keyer<STANDARD_KEY_PARTS> {

    /// Both phi angles, both psi angles, the direction and the three view vector components.
    pub fn standard(config: &KeyerConfig) -> Result<Self> {

        let angle = |field| -> Result<KeyerPartKind> {
            Ok(KeyerPartKind::Angle(AnglePart::new(field, config.angle_cell_width, config.angle_start_offset)?))
        };
        let axis = |axis| -> Result<KeyerPartKind> {
            Ok(KeyerPartKind::Axis(AxisPart::new(axis, config.axis_cell_width)?))
        };

        return Self::new([
            angle(AngleField::FromPhi)?,
            angle(AngleField::FromPsi)?,
            angle(AngleField::ToPhi)?,
            angle(AngleField::ToPsi)?,
            KeyerPartKind::Direction(DirectionPart),
            axis(ViewAxis::X)?,
            axis(ViewAxis::Y)?,
            axis(ViewAxis::Z)?,
        ]);
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct KeyerConfig {
    /// Degrees.
    pub angle_cell_width: f32,
    /// Degrees added to -180 to give the start of the first angle cell.
    pub angle_start_offset: f32,
    /// Angstroms.
    pub axis_cell_width: f32,
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::criteria::DirectionCriterion;

    fn keyer() -> Keyer<STANDARD_KEY_PARTS> {

        let config = KeyerConfig {
            angle_cell_width: 10.0,
            angle_start_offset: 0.0,
            axis_cell_width: 4.0,
        };
        return Keyer::standard(&config).unwrap();
    }

    fn criteria() -> MatchCriteria {
        return MatchCriteria::new(DirectionCriterion::MustMatch, 0, 25.0, 30.0, 15.0, 15.0).unwrap();
    }

    #[test]
    fn quick_key_within_close_keys() {

        let keyer = keyer();
        let crit = criteria();
        let mut rng = rand::thread_rng();

        for _ in 0..5000 {
            let view = View::random(&mut rng, 30.0);
            let key = keyer.make_key(&view);
            let close = keyer.make_close_keys(&view, &crit);
            assert!(close.contains(&key));
            assert!(keyer.make_min_close_key(&view, &crit) <= key);
            assert!(key <= keyer.make_max_close_key(&view, &crit));
        }
    }

    #[test]
    fn quick_keys_are_deterministic() {

        let keyer = keyer();
        let mut rng = rand::thread_rng();
        let view = View::random(&mut rng, 30.0);

        assert_eq!(keyer.make_key(&view), keyer.make_key(&view));
        assert_eq!(keyer.make_close_keys(&view, &criteria()), keyer.make_close_keys(&view, &criteria()));
        assert_eq!(keyer.clone().make_key(&view), keyer.make_key(&view));
    }

    #[test]
    fn quick_standard_part_names() {

        assert_eq!(keyer().part_names(), vec!["from_phi", "from_psi", "to_phi", "to_psi", "direction", "view_x", "view_y", "view_z"]);
    }

    #[test]
    fn quick_bad_keyers() {

        let bad_width = KeyerConfig {
            angle_cell_width: 0.0,
            angle_start_offset: 0.0,
            axis_cell_width: 4.0,
        };
        assert!(Keyer::standard(&bad_width).is_err());

        let too_many = [KeyerPartKind::Direction(DirectionPart); MAX_KEY_PARTS + 1];
        assert!(Keyer::new(too_many).is_err());

        let none: [KeyerPartKind; 0] = [];
        assert!(Keyer::new(none).is_err());
    }

    #[test]
    fn quick_fine_axis_keys_enumerate() {

        let keyer = Keyer::new([KeyerPartKind::Axis(AxisPart::new(ViewAxis::X, 0.001).unwrap())]).unwrap();
        let crit = MatchCriteria::new(DirectionCriterion::MustMatch, 0, 400.0, 30.0, 15.0, 15.0).unwrap();
        let mut view = View::random(&mut rand::thread_rng(), 0.0);
        view.view_vector.x = 0.0;

        let close = keyer.make_close_keys(&view, &crit);
        assert!(close.num_keys() > 40000);

        let keys: Vec<Key<1>> = close.cross().collect();
        assert_eq!(keys.len(), close.num_keys());
        assert_eq!(keys[0], close.min_key());
        assert_eq!(*keys.last().unwrap(), close.max_key());
        assert!(keys.windows(2).all(|pair| pair[1].0[0] == pair[0].0[0] + 1));
        assert!(keys.contains(&keyer.make_key(&view)));
    }

    #[test]
    fn quick_key_pack_round_trip() {

        let key = Key([3, -4, 0, 35, 1, -7, 2, 9]);
        assert_eq!(Key::<8>::unpack(key.pack()), key);
    }
}
