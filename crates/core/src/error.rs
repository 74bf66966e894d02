use ::derive_more::From;

/// Error returned when read partitioning cannot produce a result.
///
/// Degenerate-but-valid inputs (no heterozygous columns, an edgeless
/// conflict graph) are successful outcomes, not errors; invariant
/// violations abort instead of surfacing here.
#[derive(Debug, From)]
pub enum Error<E> {
    /// The input sequence set was empty.
    EmptyInput,
    /// The MSA engine failed; carries the engine's own error.
    #[from]
    Msa(E),
    /// The removal solver's deadline expired without a usable removal set.
    MfrTimeout,
}
