#![forbid(unsafe_code)]

//! Multi-source derived cells.
//!
//! A combined cell recomputes once per propagation cycle no matter how many
//! of its sources changed in that cycle, and always from their settled
//! values. Two cells derived from the same root therefore never produce an
//! intermediate mixed value in a cell that combines them.
//!
//! Combined cells are read-only.

use crate::node::{Access, Node};
use crate::observable::Observable;
use crate::runtime::AnyNode;

/// Combine two cells.
pub fn combine2<A, B, R>(
    a: &Observable<A>,
    b: &Observable<B>,
    combine: impl Fn(&A, &B) -> R + 'static,
) -> Observable<R>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
    R: Clone + PartialEq + 'static,
{
    let initial = a.with(|va| b.with(|vb| combine(va, vb)));
    let (sa, sb) = (a.clone(), b.clone());
    let compute = Box::new(move || sa.with(|va| sb.with(|vb| combine(va, vb))));
    let sources: [&dyn AnyNode; 2] = [&*a.node, &*b.node];
    Observable::from_node(Node::derive_from(initial, &sources, compute, Access::ReadOnly))
}

/// Combine three cells.
pub fn combine3<A, B, C, R>(
    a: &Observable<A>,
    b: &Observable<B>,
    c: &Observable<C>,
    combine: impl Fn(&A, &B, &C) -> R + 'static,
) -> Observable<R>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
    C: Clone + PartialEq + 'static,
    R: Clone + PartialEq + 'static,
{
    let initial = a.with(|va| b.with(|vb| c.with(|vc| combine(va, vb, vc))));
    let (sa, sb, sc) = (a.clone(), b.clone(), c.clone());
    let compute =
        Box::new(move || sa.with(|va| sb.with(|vb| sc.with(|vc| combine(va, vb, vc)))));
    let sources: [&dyn AnyNode; 3] = [&*a.node, &*b.node, &*c.node];
    Observable::from_node(Node::derive_from(initial, &sources, compute, Access::ReadOnly))
}

/// Combine four cells.
pub fn combine4<A, B, C, D, R>(
    a: &Observable<A>,
    b: &Observable<B>,
    c: &Observable<C>,
    d: &Observable<D>,
    combine: impl Fn(&A, &B, &C, &D) -> R + 'static,
) -> Observable<R>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
    C: Clone + PartialEq + 'static,
    D: Clone + PartialEq + 'static,
    R: Clone + PartialEq + 'static,
{
    let eval = move |a: &Observable<A>, b: &Observable<B>, c: &Observable<C>, d: &Observable<D>| {
        a.with(|va| b.with(|vb| c.with(|vc| d.with(|vd| combine(va, vb, vc, vd)))))
    };
    let initial = eval(a, b, c, d);
    let (sa, sb, sc, sd) = (a.clone(), b.clone(), c.clone(), d.clone());
    let compute = Box::new(move || eval(&sa, &sb, &sc, &sd));
    let sources: [&dyn AnyNode; 4] = [&*a.node, &*b.node, &*c.node, &*d.node];
    Observable::from_node(Node::derive_from(initial, &sources, compute, Access::ReadOnly))
}

/// Combine any number of cells of the same type.
///
/// `combine` receives the current values in source order. With no sources
/// the result is a cell holding `combine(&[])` that never changes.
pub fn combine_all<T, R>(
    sources: &[Observable<T>],
    combine: impl Fn(&[T]) -> R + 'static,
) -> Observable<R>
where
    T: Clone + PartialEq + 'static,
    R: Clone + PartialEq + 'static,
{
    let handles: Vec<Observable<T>> = sources.to_vec();
    let initial = combine(&handles.iter().map(Observable::get).collect::<Vec<_>>());
    let upstream: Vec<&dyn AnyNode> = sources
        .iter()
        .map(|source| &*source.node as &dyn AnyNode)
        .collect();
    let compute = Box::new(move || {
        let values: Vec<T> = handles.iter().map(Observable::get).collect();
        combine(&values)
    });
    Observable::from_node(Node::derive_from(initial, &upstream, compute, Access::ReadOnly))
}
