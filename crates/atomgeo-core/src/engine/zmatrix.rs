use super::config::{GeometryConfig, ReferenceSelection};
use super::error::GeometryError;
use crate::core::models::cloud::PointCloud;
use crate::core::models::element::Element;
use crate::core::utils::geometry::{VectorError, angle, dihedral, distance};
use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument, trace, warn};

pub type BondPair = (usize, usize);
pub type AngleTriple = (usize, usize, usize);
pub type DihedralQuad = (usize, usize, usize, usize);

/// Caller-supplied constraints on how the Z-matrix exposes its coordinates.
///
/// `shown_lengths` lists bonds whose lengths become named variables instead of literals.
/// Each `same_lengths` group declares bonds that share a single variable. Bond pairs are
/// unordered. The angle and dihedral lists are accepted for interface symmetry but are
/// not applied to the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintSpec {
    pub shown_lengths: Vec<BondPair>,
    pub shown_angles: Vec<AngleTriple>,
    pub shown_dihedrals: Vec<DihedralQuad>,
    pub same_lengths: Vec<Vec<BondPair>>,
    pub same_angles: Vec<Vec<AngleTriple>>,
    pub same_dihedrals: Vec<Vec<DihedralQuad>>,
}

impl ConstraintSpec {
    fn has_unapplied_constraints(&self) -> bool {
        !(self.shown_angles.is_empty()
            && self.shown_dihedrals.is_empty()
            && self.same_angles.is_empty()
            && self.same_dihedrals.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZValue {
    Literal(f64),
    Variable(String),
}

impl ZValue {
    pub fn as_literal(&self) -> Option<f64> {
        match self {
            ZValue::Literal(value) => Some(*value),
            ZValue::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            ZValue::Literal(_) => None,
            ZValue::Variable(name) => Some(name),
        }
    }

    /// The numeric value, looking variables up in `variables`.
    pub fn resolve(&self, variables: &VariableTable) -> Option<f64> {
        match self {
            ZValue::Literal(value) => Some(*value),
            ZValue::Variable(name) => variables.get(name).map(|v| v.value),
        }
    }
}

impl fmt::Display for ZValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZValue::Literal(value) => write!(f, "{value:.6}"),
            ZValue::Variable(name) => f.write_str(name),
        }
    }
}

/// One internal coordinate: the atom it is measured against and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct ZReference {
    pub atom: usize,
    pub value: ZValue,
}

impl ZReference {
    fn literal(atom: usize, value: f64) -> Self {
        Self {
            atom,
            value: ZValue::Literal(value),
        }
    }
}

/// Internal coordinates of one atom.
///
/// Atom 0 has none, atom 1 only a bond, atom 2 a bond and an angle, every later atom all
/// three. The angle is measured at the bond reference; the dihedral is the torsion about
/// the bond-reference/angle-reference axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZMatrixEntry {
    pub bond: Option<ZReference>,
    pub angle: Option<ZReference>,
    pub dihedral: Option<ZReference>,
}

impl ZMatrixEntry {
    fn shift_references(&mut self, offset: usize) {
        for reference in [&mut self.bond, &mut self.angle, &mut self.dihedral]
            .into_iter()
            .flatten()
        {
            reference.atom += offset;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    /// The bonded pair `(reference, atom)` the variable measures.
    pub atoms: BondPair,
    pub value: f64,
}

/// Named geometric variables in the order they were introduced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    entries: Vec<(String, Variable)>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, variable)| variable)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.entries.iter().map(|(name, variable)| (name.as_str(), variable))
    }

    fn insert(&mut self, name: String, variable: Variable) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = variable,
            None => self.entries.push((name, variable)),
        }
    }
}

/// A Z-matrix: per-atom internal coordinates plus the variables they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct ZMatrix {
    pub entries: Vec<ZMatrixEntry>,
    pub variables: VariableTable,
    elements: Option<Vec<Element>>,
}

impl ZMatrix {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ZMatrix {
    /// Conventional text layout with 1-based references, element symbols when known
    /// (`X` otherwise), and a trailing variable block.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            let label = self
                .elements
                .as_ref()
                .and_then(|elements| elements.get(index))
                .map_or("X", |element| element.symbol());
            write!(f, "{label}")?;
            for reference in [&entry.bond, &entry.angle, &entry.dihedral]
                .into_iter()
                .flatten()
            {
                write!(f, " {} {}", reference.atom + 1, reference.value)?;
            }
            writeln!(f)?;
        }
        if !self.variables.is_empty() {
            writeln!(f, "Variables:")?;
            for (name, variable) in self.variables.iter() {
                writeln!(f, "{name} = {:.6}", variable.value)?;
            }
        }
        Ok(())
    }
}

/// Picks the reference atom for `atom` among earlier indices not in `exclude`.
pub fn reference_candidate(
    atom: usize,
    exclude: &[usize],
    selection: ReferenceSelection,
) -> Option<usize> {
    let eligible = |candidate: &usize| !exclude.contains(candidate);
    match selection {
        ReferenceSelection::Preceding => (0..atom).rev().find(eligible),
        ReferenceSelection::LowestIndex => (0..atom).find(eligible),
    }
}

fn normalized_pair((a, b): BondPair, atom_count: usize) -> Result<BondPair, GeometryError> {
    if a == b {
        return Err(GeometryError::InvalidInput(format!(
            "bond constraint ({a}, {b}) references the same atom twice"
        )));
    }
    let (lower, upper) = if a < b { (a, b) } else { (b, a) };
    if upper >= atom_count {
        return Err(VectorError::IndexOutOfRange {
            index: upper,
            len: atom_count,
        }
        .into());
    }
    Ok((lower, upper))
}

/// Converts Cartesian positions into a Z-matrix.
///
/// Atoms are visited in order. Each atom's bond reference comes from a shown length ending
/// at it when one exists, otherwise from the configured [`ReferenceSelection`]; angle and
/// dihedral references are the next eligible earlier atoms. All references, variable names
/// and variable atom pairs are shifted by the builder's offset so fragments can be
/// concatenated.
#[derive(Debug, Clone, Default)]
pub struct ZMatrixBuilder {
    constraints: ConstraintSpec,
    offset: usize,
    selection: ReferenceSelection,
}

impl ZMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GeometryConfig) -> Self {
        Self::new().with_reference_selection(config.reference_selection)
    }

    pub fn with_constraints(mut self, constraints: ConstraintSpec) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_reference_selection(mut self, selection: ReferenceSelection) -> Self {
        self.selection = selection;
        self
    }

    #[instrument(
        skip_all,
        name = "zmatrix_build",
        fields(atoms = cloud.len(), offset = self.offset)
    )]
    pub fn build(&self, cloud: &PointCloud) -> Result<ZMatrix, GeometryError> {
        let positions = cloud.positions();
        let atom_count = positions.len();

        let mut shown: Vec<BondPair> = self
            .constraints
            .shown_lengths
            .iter()
            .map(|&pair| normalized_pair(pair, atom_count))
            .collect::<Result<_, _>>()?;
        shown.sort_unstable();
        shown.dedup();

        let groups: Vec<Vec<BondPair>> = self
            .constraints
            .same_lengths
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|&pair| normalized_pair(pair, atom_count))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<_, _>>()?;

        if self.constraints.has_unapplied_constraints() {
            warn!(
                "Angle and dihedral constraints are not applied; \
                 only bond lengths become variables."
            );
        }
        if shown.iter().any(|&(_, upper)| upper == 1) {
            warn!(
                "A shown length ending at atom 1 is ignored; \
                 atom 1 always bonds to atom 0 with a literal length."
            );
        }

        let mut group_names: Vec<Option<String>> = vec![None; groups.len()];
        let mut variables = VariableTable::new();
        let mut entries = Vec::with_capacity(atom_count);

        for ai in 0..atom_count {
            let entry = match ai {
                0 => ZMatrixEntry::default(),
                1 => ZMatrixEntry {
                    bond: Some(ZReference::literal(0, distance(positions, 1, 0)?)),
                    ..ZMatrixEntry::default()
                },
                _ => self.internal_coordinates(
                    ai,
                    positions,
                    &shown,
                    &groups,
                    &mut group_names,
                    &mut variables,
                )?,
            };
            trace!(atom = ai, ?entry, "Built Z-matrix row.");
            entries.push(entry);
        }

        if self.offset != 0 {
            for entry in &mut entries {
                entry.shift_references(self.offset);
            }
        }

        debug!(
            variables = variables.len(),
            "Z-matrix construction complete."
        );
        Ok(ZMatrix {
            entries,
            variables,
            elements: cloud.elements().map(<[Element]>::to_vec),
        })
    }

    fn internal_coordinates(
        &self,
        ai: usize,
        positions: &[Point3<f64>],
        shown: &[BondPair],
        groups: &[Vec<BondPair>],
        group_names: &mut [Option<String>],
        variables: &mut VariableTable,
    ) -> Result<ZMatrixEntry, GeometryError> {
        let (a0, bond) = match shown.iter().find(|&&(_, upper)| upper == ai) {
            Some(&(lower, upper)) => {
                let name = self.length_variable(
                    (lower, upper),
                    positions,
                    groups,
                    group_names,
                    variables,
                )?;
                (
                    lower,
                    ZReference {
                        atom: lower,
                        value: ZValue::Variable(name),
                    },
                )
            }
            None => {
                let a0 = self.reference(ai, &[], "bond")?;
                (a0, ZReference::literal(a0, distance(positions, ai, a0)?))
            }
        };

        let a1 = self.reference(ai, &[a0], "angle")?;
        let angle_ref = ZReference::literal(a1, angle(positions, ai, a0, a1)?);

        let dihedral_ref = if ai >= 3 {
            let a2 = self.reference(ai, &[a0, a1], "dihedral")?;
            Some(ZReference::literal(
                a2,
                dihedral(positions, ai, a0, a1, a2)?,
            ))
        } else {
            None
        };

        Ok(ZMatrixEntry {
            bond: Some(bond),
            angle: Some(angle_ref),
            dihedral: dihedral_ref,
        })
    }

    fn reference(
        &self,
        ai: usize,
        exclude: &[usize],
        coordinate: &'static str,
    ) -> Result<usize, GeometryError> {
        reference_candidate(ai, exclude, self.selection)
            .ok_or(GeometryError::Construction { atom: ai, coordinate })
    }

    /// Returns the variable name for a shown bond, registering it on first use.
    ///
    /// A bond in an equivalence group whose name is already set reuses that name without
    /// registering a new variable.
    fn length_variable(
        &self,
        (lower, upper): BondPair,
        positions: &[Point3<f64>],
        groups: &[Vec<BondPair>],
        group_names: &mut [Option<String>],
        variables: &mut VariableTable,
    ) -> Result<String, GeometryError> {
        let atoms = (lower + self.offset, upper + self.offset);
        let name = format!("R_{}_{}", atoms.0, atoms.1);

        if let Some(index) = groups.iter().position(|group| group.contains(&(lower, upper))) {
            match &group_names[index] {
                Some(shared) => {
                    debug!(
                        bond = ?(lower, upper),
                        variable = %shared,
                        "Reusing shared length variable."
                    );
                    return Ok(shared.clone());
                }
                None => group_names[index] = Some(name.clone()),
            }
        }

        let value = distance(positions, lower, upper)?;
        variables.insert(name.clone(), Variable { atoms, value });
        Ok(name)
    }
}
