//! The script `Vector` container: a growable array of boxed values.

use crate::{
    dispatch::NativeFn,
    engine::Engine,
    exception::Exception,
    pod::PodView,
    value::{BoxedValue, TypeInfo},
};

/// Growable array of boxed values, the backing type of inline `[a, b, c]`
/// literals.
///
/// Elements are boxed records: `v[i]` hands out a view sharing the element's
/// cell, so compound assignment through the view writes into the container.
/// Cloning the container copies the element list but not the element cells.
#[derive(Debug, Clone, Default)]
pub struct Vector(pub Vec<BoxedValue>);

/// Extracts a non-negative element index from a boxed numeric.
fn element_index(value: &BoxedValue, size: usize) -> Result<usize, Exception> {
    let pod = PodView::from_boxed(value)?;
    if pod.is_float() {
        return Err(Exception::eval("index must be an integer"));
    }
    let index = pod.as_i64();
    usize::try_from(index)
        .ok()
        .filter(|i| *i < size)
        .ok_or_else(|| Exception::eval(format!("index {index} out of range (size {size})")))
}

pub(crate) fn install(engine: &Engine) {
    engine.add_overload(
        "Vector",
        NativeFn::new(vec![], |_, _| Ok(BoxedValue::new(Vector::default()))),
    );

    engine.add_overload(
        "push_back",
        NativeFn::new(vec![TypeInfo::of::<Vector>(), TypeInfo::void()], |_, args| {
            let element = args[1].clone();
            args[0].with_mut::<Vector, _>(|v| v.0.push(element))?;
            Ok(BoxedValue::void())
        }),
    );

    engine.add_overload(
        "pop_back",
        NativeFn::new(vec![TypeInfo::of::<Vector>()], |_, args| {
            args[0]
                .with_mut::<Vector, _>(|v| v.0.pop())?
                .map_or_else(|| Err(Exception::eval("pop_back on an empty Vector")), Ok)
        }),
    );

    engine.add_overload(
        "size",
        NativeFn::new(vec![TypeInfo::of::<Vector>()], |_, args| {
            let size = args[0].with_ref::<Vector, _>(|v| v.0.len())?;
            Ok(BoxedValue::new(size as i64))
        }),
    );

    engine.add_overload(
        "[]",
        NativeFn::new(vec![TypeInfo::of::<Vector>(), TypeInfo::void()], |_, args| {
            let size = args[0].with_ref::<Vector, _>(|v| v.0.len())?;
            let index = element_index(&args[1], size)?;
            args[0].with_ref::<Vector, _>(|v| v.0[index].clone())
        }),
    );

    engine.add_overload(
        "clone",
        NativeFn::new(vec![TypeInfo::of::<Vector>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<Vector>()?))
        }),
    );
}
