//! [`Stream`] wraps a restartable source behind a lazy pipeline of
//! chained stages.
//!
//! A stream performs no work until a terminal operator runs. Each
//! chaining call returns a new `Stream` value composing the prior chain
//! with one more stage; the original stays usable. Consuming a stream
//! opens a fresh traversal of the source through its [`Producer`], so a
//! collection-backed stream can be evaluated any number of times.
//!
//! ```
//! let strm = Stream::new([1, 2, 3]).map(X * 2);
//! strm.to_list()?;    // [2, 4, 6]
//! strm.to_list()?;    // [2, 4, 6] again, fresh traversal
//! ```
//!
//! Elements are pulled depth-first: one element travels through the
//! whole stage chain before the next is taken from the source. That is
//! what lets [`Stream::take`] stop an infinite source.

use core::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{debug, trace};
use serde_json::Value;

use crate::callable::Callable;
use crate::expr::eval::{truthy, type_name};
use crate::optional::Optional;
use crate::table::StreamTable;

/// A fresh traversal over the ultimate source.
pub type SourceIter = Box<dyn Iterator<Item = Value>>;

/// A repeatable factory for traversals. Invoked once per terminal
/// operator run.
pub type Producer = Arc<dyn Fn() -> SourceIter + Send + Sync>;

pub(crate) type ValueIter = Box<dyn Iterator<Item = Result<Value>>>;

/// One link in the pending transformation chain.
#[derive(Clone, Debug)]
pub enum Stage {
    Map(Callable),
    Filter(Callable),
    FilterFalse(Callable),
    FlatMap(Callable),
    Take(usize),
    Drop(usize),
    TakeWhile(Callable),
    DropWhile(Callable),
}

impl Stage {
    fn kind(&self) -> &'static str {
        match self {
            Stage::Map(_) => "map",
            Stage::Filter(_) => "filter",
            Stage::FilterFalse(_) => "filter_false",
            Stage::FlatMap(_) => "flat_map",
            Stage::Take(_) => "take",
            Stage::Drop(_) => "drop",
            Stage::TakeWhile(_) => "take_while",
            Stage::DropWhile(_) => "drop_while",
        }
    }

    fn apply(&self, input: ValueIter) -> ValueIter {
        match self {
            Stage::Map(callable) => {
                let callable = callable.clone();
                Box::new(input.map(move |elem| elem.and_then(|v| callable.invoke(&v))))
            }
            Stage::Filter(callable) => filter_iter(input, callable.clone(), true),
            Stage::FilterFalse(callable) => filter_iter(input, callable.clone(), false),
            Stage::FlatMap(callable) => {
                let callable = callable.clone();
                Box::new(input.flat_map(move |elem| -> Vec<Result<Value>> {
                    match elem.and_then(|v| callable.invoke(&v)) {
                        Ok(Value::Array(items)) => items.into_iter().map(Ok).collect(),
                        Ok(other) => vec![Err(anyhow!(
                            "flat_map stage must produce an array, got {}",
                            type_name(&other)
                        ))],
                        Err(e) => vec![Err(e)],
                    }
                }))
            }
            Stage::Take(n) => Box::new(input.take(*n)),
            Stage::Drop(n) => Box::new(input.skip(*n)),
            Stage::TakeWhile(callable) => {
                let callable = callable.clone();
                // scan's None ends the iterator, so upstream is no
                // longer pulled once the predicate fails
                Box::new(input.scan((), move |_, elem| match elem {
                    Ok(v) => match callable.invoke(&v) {
                        Ok(p) if truthy(&p) => Some(Ok(v)),
                        Ok(_) => None,
                        Err(e) => Some(Err(e)),
                    },
                    Err(e) => Some(Err(e)),
                }))
            }
            Stage::DropWhile(callable) => {
                let callable = callable.clone();
                let mut dropping = true;
                Box::new(input.filter_map(move |elem| match elem {
                    Ok(v) => {
                        if !dropping {
                            return Some(Ok(v));
                        }
                        match callable.invoke(&v) {
                            Ok(p) if truthy(&p) => None,
                            Ok(_) => {
                                dropping = false;
                                Some(Ok(v))
                            }
                            Err(e) => Some(Err(e)),
                        }
                    }
                    Err(e) => Some(Err(e)),
                }))
            }
        }
    }
}

fn filter_iter(input: ValueIter, callable: Callable, keep_truthy: bool) -> ValueIter {
    Box::new(input.filter_map(move |elem| match elem {
        Ok(v) => match callable.invoke(&v) {
            Ok(p) => (truthy(&p) == keep_truthy).then(|| Ok(v)),
            Err(e) => Some(Err(e)),
        },
        Err(e) => Some(Err(e)),
    }))
}

/// An immutable, restartable, lazy value pipeline.
#[derive(Clone)]
pub struct Stream {
    producer: Producer,
    stages: Vec<Stage>,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

impl Stream {
    /// Wrap a finite collection of values. The collection is captured
    /// once and replayed on every traversal.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::from_producer(move || Box::new(values.clone().into_iter()))
    }

    /// Wrap a custom source. The producer is called once per terminal
    /// operator run; restartability is exactly as good as the producer's.
    pub fn from_producer(producer: impl Fn() -> SourceIter + Send + Sync + 'static) -> Self {
        Self {
            producer: Arc::new(producer),
            stages: Vec::new(),
        }
    }

    /// Integers from `start` (inclusive) to `end` (exclusive).
    pub fn range(start: i64, end: i64, step: i64) -> Self {
        debug_assert!(step != 0, "range step must be nonzero");
        Self::from_producer(move || {
            let ascending = step > 0;
            Box::new(
                std::iter::successors(Some(start), move |&n| Some(n + step))
                    .take_while(move |&n| if ascending { n < end } else { n > end })
                    .map(Value::from),
            )
        })
    }

    /// Infinite consecutive integers.
    pub fn count(start: i64, step: i64) -> Self {
        Self::from_producer(move || {
            Box::new(std::iter::successors(Some(start), move |&n| Some(n + step)).map(Value::from))
        })
    }

    /// Repeat one value, forever when `times` is `None`.
    pub fn repeat(value: impl Into<Value>, times: Option<usize>) -> Self {
        let value = value.into();
        Self::from_producer(move || {
            let repeated = std::iter::repeat(value.clone());
            match times {
                Some(n) => Box::new(repeated.take(n)),
                None => Box::new(repeated),
            }
        })
    }

    /// Cycle a finite collection forever.
    pub fn cycle<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::from_producer(move || Box::new(values.clone().into_iter().cycle()))
    }

    /// Infinite stream recursively applying `func` to the last value.
    pub fn iterate(
        func: impl Fn(&Value) -> Value + Send + Sync + 'static,
        seed: impl Into<Value>,
    ) -> Self {
        let seed = seed.into();
        let func = Arc::new(func);
        Self::from_producer(move || {
            let func = func.clone();
            Box::new(std::iter::successors(Some(seed.clone()), move |prev| {
                Some(func(prev))
            }))
        })
    }

    fn with_stage(&self, stage: Stage) -> Self {
        let mut stages = self.stages.clone();
        stages.push(stage);
        Self {
            producer: self.producer.clone(),
            stages,
        }
    }

    /// Transform each element.
    pub fn map(&self, func: impl Into<Callable>) -> Self {
        self.with_stage(Stage::Map(func.into()))
    }

    /// Keep elements whose predicate evaluates truthy.
    pub fn filter(&self, pred: impl Into<Callable>) -> Self {
        self.with_stage(Stage::Filter(pred.into()))
    }

    /// Keep elements whose predicate evaluates falsy.
    pub fn filter_false(&self, pred: impl Into<Callable>) -> Self {
        self.with_stage(Stage::FilterFalse(pred.into()))
    }

    /// Map each element to an array and flatten the results one level,
    /// preserving order.
    pub fn flat_map(&self, func: impl Into<Callable>) -> Self {
        self.with_stage(Stage::FlatMap(func.into()))
    }

    /// Stop after `n` elements. Upstream stages never see elements
    /// beyond the cutoff, which matters on infinite sources.
    pub fn take(&self, n: usize) -> Self {
        self.with_stage(Stage::Take(n))
    }

    /// Skip the first `n` elements.
    pub fn drop(&self, n: usize) -> Self {
        self.with_stage(Stage::Drop(n))
    }

    pub fn take_while(&self, pred: impl Into<Callable>) -> Self {
        self.with_stage(Stage::TakeWhile(pred.into()))
    }

    pub fn drop_while(&self, pred: impl Into<Callable>) -> Self {
        self.with_stage(Stage::DropWhile(pred.into()))
    }

    /// Open a fresh traversal through the stage chain. Lazy; elements
    /// are computed as the iterator is advanced.
    pub fn iter(&self) -> impl Iterator<Item = Result<Value>> {
        debug!("opening traversal with {} stages", self.stages.len());
        let mut iter: ValueIter = Box::new((self.producer)().map(Ok));
        for stage in &self.stages {
            trace!("chaining stage {}", stage.kind());
            iter = stage.apply(iter);
        }
        iter
    }

    /// Drive the whole chain and collect the results. A stage error
    /// aborts the traversal and surfaces here.
    pub fn to_list(&self) -> Result<Vec<Value>> {
        self.iter().collect()
    }

    pub fn for_each(&self, mut func: impl FnMut(Value)) -> Result<()> {
        for elem in self.iter() {
            func(elem?);
        }
        Ok(())
    }

    /// First element, if any. Pulls at most one element from the source.
    pub fn first_opt(&self) -> Result<Optional<Value>> {
        match self.iter().next() {
            Some(elem) => Ok(Optional::Some(elem?)),
            None => Ok(Optional::Nothing),
        }
    }

    /// Number of elements the chain yields.
    pub fn len(&self) -> Result<usize> {
        self.iter().try_fold(0usize, |acc, elem| {
            elem?;
            Ok(acc + 1)
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.iter().next().transpose()?.is_none())
    }

    /// View this stream as a table of rows.
    pub fn to_table(&self) -> StreamTable {
        StreamTable::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Operations, X};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_to_list() {
        assert_eq!(Stream::new([1, 2, 3]).to_list().unwrap(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(Stream::range(2, 10, 2).to_list().unwrap(), vec![json!(2), json!(4), json!(6), json!(8)]);
        assert_eq!(Stream::range(3, 0, -1).to_list().unwrap(), vec![json!(3), json!(2), json!(1)]);
    }

    #[test]
    fn test_map_and_filter() {
        let strm = Stream::range(0, 10, 1);
        assert_eq!(
            strm.map(X * 2).filter((X % 3).eq(0)).to_list().unwrap(),
            vec![json!(0), json!(6), json!(12), json!(18)]
        );
        assert_eq!(
            strm.filter_false((X % 2).eq(0)).to_list().unwrap(),
            vec![json!(1), json!(3), json!(5), json!(7), json!(9)]
        );
    }

    #[test]
    fn test_plain_functions_mix_with_expressions() {
        let strm = Stream::new([1, 2, 3])
            .map(|v: &Value| json!(v.as_i64().unwrap() * 10))
            .filter(X.gt(10));
        assert_eq!(strm.to_list().unwrap(), vec![json!(20), json!(30)]);
    }

    #[test]
    fn test_flat_map() {
        let strm = Stream::new([1, 2, 3]).flat_map(|v: &Value| json!([v, v]));
        assert_eq!(
            strm.to_list().unwrap(),
            vec![json!(1), json!(1), json!(2), json!(2), json!(3), json!(3)]
        );
    }

    #[test]
    fn test_laziness() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let strm = Stream::new([1, 2, 3])
            .map(move |v: &Value| {
                counter.fetch_add(1, Ordering::SeqCst);
                v.clone()
            })
            .filter(X.gt(0));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        strm.to_list().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_take_short_circuits_infinite_source() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let strm = Stream::from_producer(move || {
            let counter = counter.clone();
            Box::new((0i64..).map(move |n| {
                counter.fetch_add(1, Ordering::SeqCst);
                Value::from(n)
            }))
        });

        assert_eq!(
            strm.take(3).to_list().unwrap(),
            vec![json!(0), json!(1), json!(2)]
        );
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_take_while_stops_pulling() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let strm = Stream::from_producer(move || {
            let counter = counter.clone();
            Box::new((0i64..).map(move |n| {
                counter.fetch_add(1, Ordering::SeqCst);
                Value::from(n)
            }))
        });

        assert_eq!(
            strm.take_while(X.lt(3)).to_list().unwrap(),
            vec![json!(0), json!(1), json!(2)]
        );
        // one extra pull to observe the failing element
        assert_eq!(pulled.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_chaining_leaves_original_untouched() {
        let strm = Stream::new([1, 2, 3]);
        let doubled = strm.map(X * 2);

        assert_eq!(doubled.to_list().unwrap(), vec![json!(2), json!(4), json!(6)]);
        assert_eq!(strm.to_list().unwrap(), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_restartable() {
        let strm = Stream::new([1, 2, 3]).map(X + 1);
        let first = strm.to_list().unwrap();
        let second = strm.to_list().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_infinite_constructors() {
        assert_eq!(
            Stream::count(0, 3).take(3).to_list().unwrap(),
            vec![json!(0), json!(3), json!(6)]
        );
        assert_eq!(
            Stream::cycle([1, 2]).take(5).to_list().unwrap(),
            vec![json!(1), json!(2), json!(1), json!(2), json!(1)]
        );
        assert_eq!(
            Stream::repeat(7, Some(3)).to_list().unwrap(),
            vec![json!(7), json!(7), json!(7)]
        );
        assert_eq!(
            Stream::iterate(|v| json!(v.as_i64().unwrap() * 2), 3)
                .take(4)
                .to_list()
                .unwrap(),
            vec![json!(3), json!(6), json!(12), json!(24)]
        );
    }

    #[test]
    fn test_drop_and_drop_while() {
        assert_eq!(
            Stream::range(0, 5, 1).drop(3).to_list().unwrap(),
            vec![json!(3), json!(4)]
        );
        assert_eq!(
            Stream::range(0, 5, 1).drop_while(X.lt(3)).to_list().unwrap(),
            vec![json!(3), json!(4)]
        );
    }

    #[test]
    fn test_stage_error_aborts_traversal() {
        let strm = Stream::new([json!(1), json!("two"), json!(3)]).map(X + 1);
        assert!(strm.to_list().is_err());
    }

    #[test]
    fn test_first_opt_and_len() {
        assert_eq!(
            Stream::new([5, 6]).first_opt().unwrap(),
            Optional::Some(json!(5))
        );
        assert!(Stream::new(Vec::<Value>::new()).first_opt().unwrap().is_nothing());
        assert_eq!(Stream::range(0, 10, 1).len().unwrap(), 10);
    }
}
