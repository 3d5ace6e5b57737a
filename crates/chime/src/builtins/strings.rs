//! String operations: concatenation, comparison, `size`, `to_string`.

use crate::{
    dispatch::NativeFn,
    engine::Engine,
    value::{BoxedValue, TypeInfo},
};

use super::display_value;

fn string_pair() -> Vec<TypeInfo> {
    vec![TypeInfo::of::<String>(), TypeInfo::of::<String>()]
}

macro_rules! register_comparison {
    ($engine:ident, $name:literal, $op:tt) => {
        $engine.add_overload(
            $name,
            NativeFn::new(string_pair(), |_, args| {
                let result = args[0].with_ref::<String, _>(|a| {
                    args[1].with_ref::<String, _>(|b| a $op b)
                })??;
                Ok(BoxedValue::new(result))
            }),
        );
    };
}

pub(crate) fn install(engine: &Engine) {
    engine.add_overload(
        "+",
        NativeFn::new(string_pair(), |_, args| {
            let mut result = args[0].clone_as::<String>()?;
            args[1].with_ref::<String, _>(|b| result.push_str(b))?;
            Ok(BoxedValue::new(result))
        }),
    );
    engine.add_overload(
        "+",
        NativeFn::new(vec![TypeInfo::of::<String>(), TypeInfo::of::<char>()], |_, args| {
            let mut result = args[0].clone_as::<String>()?;
            result.push(args[1].clone_as::<char>()?);
            Ok(BoxedValue::new(result))
        }),
    );

    register_comparison!(engine, "==", ==);
    register_comparison!(engine, "!=", !=);
    register_comparison!(engine, "<", <);
    register_comparison!(engine, "<=", <=);
    register_comparison!(engine, ">", >);
    register_comparison!(engine, ">=", >=);

    engine.add_overload(
        "size",
        NativeFn::new(vec![TypeInfo::of::<String>()], |_, args| {
            let count = args[0].with_ref::<String, _>(|s| s.chars().count())?;
            Ok(BoxedValue::new(count as i64))
        }),
    );

    // Renders any value; the display rules live next to `print`.
    engine.add_overload(
        "to_string",
        NativeFn::new(vec![TypeInfo::void()], |ctx, args| {
            Ok(BoxedValue::new(display_value(&args[0], ctx.engine())))
        }),
    );

    engine.add_overload(
        "clone",
        NativeFn::new(vec![TypeInfo::of::<String>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<String>()?))
        }),
    );
}
