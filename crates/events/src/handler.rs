use stockpack_core::Aggregate;

/// Execute an aggregate command in memory: decide, then evolve.
///
/// Returns the emitted events so the caller can stage them for a single
/// append. Nothing is applied when `handle` fails, so an error leaves the
/// aggregate exactly as it was.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
