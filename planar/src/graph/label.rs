//! Topological labels.
//!
//! A [`Label`] records, for each of (up to) two input geometries, where an
//! edge or node lies relative to that geometry. For an edge of an area, it
//! also records the locations of the two sides.

use super::{Location, Position};

/// The locations of a graph component relative to one geometry.
///
/// A line location only knows about `On`; an area location also knows about
/// `Left` and `Right`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TopologyLocation {
    on: Location,
    sides: Option<[Location; 2]>,
}

impl std::fmt::Debug for TopologyLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sides {
            Some([left, right]) => write!(
                f,
                "{}{}{}",
                left.symbol(),
                self.on.symbol(),
                right.symbol()
            ),
            None => write!(f, "{}", self.on.symbol()),
        }
    }
}

impl TopologyLocation {
    pub fn line(on: Location) -> Self {
        TopologyLocation { on, sides: None }
    }

    pub fn area(on: Location, left: Location, right: Location) -> Self {
        TopologyLocation {
            on,
            sides: Some([left, right]),
        }
    }

    pub fn get(&self, pos: Position) -> Location {
        match (pos, self.sides) {
            (Position::On, _) => self.on,
            (Position::Left, Some([left, _])) => left,
            (Position::Right, Some([_, right])) => right,
            (_, None) => Location::None,
        }
    }

    /// Sets a location. Setting a side of a line location makes it an area location.
    pub fn set(&mut self, pos: Position, loc: Location) {
        match pos {
            Position::On => self.on = loc,
            Position::Left => self.sides.get_or_insert([Location::None; 2])[0] = loc,
            Position::Right => self.sides.get_or_insert([Location::None; 2])[1] = loc,
        }
    }

    pub fn is_area(&self) -> bool {
        self.sides.is_some()
    }

    pub fn is_line(&self) -> bool {
        self.sides.is_none()
    }

    /// Are all the locations `None`?
    pub fn is_null(&self) -> bool {
        self.on == Location::None
            && self
                .sides
                .map_or(true, |s| s.iter().all(|l| *l == Location::None))
    }

    /// Are any of the locations `None`?
    pub fn is_any_null(&self) -> bool {
        self.on == Location::None
            || self
                .sides
                .is_some_and(|s| s.iter().any(|l| *l == Location::None))
    }

    pub fn flip(&mut self) {
        if let Some(sides) = &mut self.sides {
            sides.swap(0, 1);
        }
    }

    pub fn set_all_if_none(&mut self, loc: Location) {
        if self.on == Location::None {
            self.on = loc;
        }
        if let Some(sides) = &mut self.sides {
            for s in sides {
                if *s == Location::None {
                    *s = loc;
                }
            }
        }
    }

    pub fn all_positions_equal(&self, loc: Location) -> bool {
        self.on == loc && self.sides.map_or(true, |s| s.iter().all(|l| *l == loc))
    }

    /// Fills in any `None` locations from `other`. Known locations are never
    /// overwritten. Merging an area location into a line location makes it an
    /// area location.
    pub fn merge(&mut self, other: &TopologyLocation) {
        if other.is_area() && self.is_line() {
            self.sides = Some([Location::None; 2]);
        }
        if self.on == Location::None {
            self.on = other.on;
        }
        if let (Some(sides), Some(other_sides)) = (&mut self.sides, other.sides) {
            for (s, o) in sides.iter_mut().zip(other_sides) {
                if *s == Location::None {
                    *s = o;
                }
            }
        }
    }

    /// Drops the side locations.
    pub fn to_line(&mut self) {
        self.sides = None;
    }
}

/// A [`TopologyLocation`] for each of two input geometries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Label {
    elt: [TopologyLocation; 2],
}

impl std::fmt::Debug for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A:{:?} B:{:?}", self.elt[0], self.elt[1])
    }
}

impl Label {
    /// A line label for `geom`, with the other geometry unknown.
    pub fn line(geom: usize, on: Location) -> Self {
        let mut ret = Label::default();
        ret.elt[geom] = TopologyLocation::line(on);
        ret
    }

    /// An area label for `geom`; the other geometry is an unknown area location.
    pub fn area(geom: usize, on: Location, left: Location, right: Location) -> Self {
        let none = TopologyLocation::area(Location::None, Location::None, Location::None);
        let mut ret = Label { elt: [none; 2] };
        ret.elt[geom] = TopologyLocation::area(on, left, right);
        ret
    }

    pub fn location(&self, geom: usize) -> &TopologyLocation {
        &self.elt[geom]
    }

    pub fn get(&self, geom: usize, pos: Position) -> Location {
        self.elt[geom].get(pos)
    }

    pub fn set(&mut self, geom: usize, pos: Position, loc: Location) {
        self.elt[geom].set(pos, loc);
    }

    pub fn set_all_if_none(&mut self, geom: usize, loc: Location) {
        self.elt[geom].set_all_if_none(loc);
    }

    pub fn flip(&mut self) {
        for e in &mut self.elt {
            e.flip();
        }
    }

    pub fn flipped(mut self) -> Self {
        self.flip();
        self
    }

    pub fn merge(&mut self, other: &Label) {
        for (e, o) in self.elt.iter_mut().zip(&other.elt) {
            e.merge(o);
        }
    }

    /// Does the label carry area information for either geometry?
    pub fn is_area(&self) -> bool {
        self.elt.iter().any(TopologyLocation::is_area)
    }

    pub fn is_area_for(&self, geom: usize) -> bool {
        self.elt[geom].is_area()
    }

    pub fn is_line(&self, geom: usize) -> bool {
        self.elt[geom].is_line()
    }

    pub fn is_null(&self, geom: usize) -> bool {
        self.elt[geom].is_null()
    }

    pub fn is_any_null(&self, geom: usize) -> bool {
        self.elt[geom].is_any_null()
    }

    /// The number of geometries this label knows anything about.
    pub fn geometry_count(&self) -> usize {
        self.elt.iter().filter(|e| !e.is_null()).count()
    }

    pub fn all_positions_equal(&self, geom: usize, loc: Location) -> bool {
        self.elt[geom].all_positions_equal(loc)
    }

    /// Collapses geometry `geom`'s area location to a line location.
    pub fn to_line(&mut self, geom: usize) {
        self.elt[geom].to_line();
    }
}
