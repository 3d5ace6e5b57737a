//! Implementation of the `print()` builtin.

use crate::{
    dispatch::NativeFn,
    engine::Engine,
    value::{BoxedValue, TypeInfo},
};

use super::display_value;

pub(crate) fn install(engine: &Engine) {
    // One value per call, rendered and newline-terminated through the
    // engine's active PrintWriter.
    engine.add_overload(
        "print",
        NativeFn::new(vec![TypeInfo::void()], |ctx, args| {
            let text = display_value(&args[0], ctx.engine());
            ctx.write(&text);
            ctx.push('\n');
            Ok(BoxedValue::void())
        }),
    );
}
