//! The script `Range` type, produced by `lo..hi` literals.

use crate::{
    dispatch::NativeFn,
    engine::Engine,
    exception::Exception,
    pod::PodView,
    value::{BoxedValue, TypeInfo},
};

/// Half-open integral range. `begin` and `end` expose the bounds; `size` is
/// zero when the range is empty or inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub lo: i64,
    pub hi: i64,
}

fn bound(value: &BoxedValue) -> Result<i64, Exception> {
    let pod = PodView::from_boxed(value)?;
    if pod.is_float() {
        return Err(Exception::eval("range bounds must be integers"));
    }
    Ok(pod.as_i64())
}

pub(crate) fn install(engine: &Engine) {
    engine.add_overload(
        "Range",
        NativeFn::new(vec![TypeInfo::void(), TypeInfo::void()], |_, args| {
            let lo = bound(&args[0])?;
            let hi = bound(&args[1])?;
            Ok(BoxedValue::new(Range { lo, hi }))
        }),
    );

    engine.add_overload(
        "begin",
        NativeFn::new(vec![TypeInfo::of::<Range>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<Range>()?.lo))
        }),
    );

    engine.add_overload(
        "end",
        NativeFn::new(vec![TypeInfo::of::<Range>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<Range>()?.hi))
        }),
    );

    engine.add_overload(
        "size",
        NativeFn::new(vec![TypeInfo::of::<Range>()], |_, args| {
            let range = args[0].clone_as::<Range>()?;
            Ok(BoxedValue::new((range.hi - range.lo).max(0)))
        }),
    );

    engine.add_overload(
        "clone",
        NativeFn::new(vec![TypeInfo::of::<Range>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<Range>()?))
        }),
    );
}
