//! The assignment operator family: `=`, `+=`, `-=`, `*=`, `/=`.
//!
//! These operate through a boxed lvalue that aliases its cell (a container
//! element, or a scope binding on the compound forms): the store writes into
//! the existing cell rather than rebinding a record, which is what makes
//! `v[0] = 5` and `x += 1` visible through every holder of the cell.

use std::any::TypeId;

use crate::{
    dispatch::{CallContext, Callable},
    engine::Engine,
    exception::Exception,
    pod::PodView,
    value::{BoxedValue, TypeInfo},
};

use super::{map::Map, range::Range, vector::Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

/// One assignment operator. A single overload handles every assignable type
/// pair so dispatch never has to order multiple wildcard signatures.
struct AssignFn {
    op: AssignOp,
    params: [TypeInfo; 2],
}

impl AssignFn {
    fn new(op: AssignOp) -> Self {
        Self {
            op,
            params: [TypeInfo::void(), TypeInfo::void()],
        }
    }

    fn type_error(&self, ctx: &CallContext<'_>, target: &BoxedValue, source: &BoxedValue) -> Exception {
        let engine = ctx.engine();
        Exception::eval(format!(
            "cannot assign {} to {}",
            engine.type_display(source.type_info()),
            engine.type_display(target.type_info()),
        ))
    }
}

impl Callable for AssignFn {
    fn arity(&self) -> usize {
        2
    }

    fn param_types(&self) -> &[TypeInfo] {
        &self.params
    }

    fn invoke(&self, ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception> {
        let target = &args[0];
        let source = &args[1];

        if target.is::<String>() {
            match self.op {
                AssignOp::Set if source.is::<String>() => {
                    let text = source.clone_as::<String>()?;
                    target.with_mut::<String, _>(|t| *t = text)?;
                    return Ok(target.clone());
                }
                AssignOp::Add if source.is::<String>() => {
                    let text = source.clone_as::<String>()?;
                    target.with_mut::<String, _>(|t| t.push_str(&text))?;
                    return Ok(target.clone());
                }
                AssignOp::Add if source.is::<char>() => {
                    let c = source.clone_as::<char>()?;
                    target.with_mut::<String, _>(|t| t.push(c))?;
                    return Ok(target.clone());
                }
                _ => return Err(self.type_error(ctx, target, source)),
            }
        }

        if self.op == AssignOp::Set {
            if target.is::<Vector>() && source.is::<Vector>() {
                let contents = source.clone_as::<Vector>()?;
                target.with_mut::<Vector, _>(|t| *t = contents)?;
                return Ok(target.clone());
            }
            if target.is::<Map>() && source.is::<Map>() {
                let contents = source.clone_as::<Map>()?;
                target.with_mut::<Map, _>(|t| *t = contents)?;
                return Ok(target.clone());
            }
            if target.is::<Range>() && source.is::<Range>() {
                let contents = source.clone_as::<Range>()?;
                target.with_mut::<Range, _>(|t| *t = contents)?;
                return Ok(target.clone());
            }
        }

        if PodView::supports(target) && PodView::supports(source) {
            // bool and char cells only accept their own kind; the numeric
            // widths convert freely, keeping the target's type.
            if (target.is::<bool>() || target.is::<char>()) && target.type_info() != source.type_info() {
                return Err(self.type_error(ctx, target, source));
            }
            let current = PodView::from_boxed(target)?;
            let incoming = PodView::from_boxed(source)?;
            let result = match self.op {
                AssignOp::Set => incoming,
                AssignOp::Add => current.add(incoming)?,
                AssignOp::Sub => current.sub(incoming)?,
                AssignOp::Mul => current.mul(incoming)?,
                AssignOp::Div => current.div(incoming)?,
            };
            store_numeric(target, result)?;
            return Ok(target.clone());
        }

        Err(self.type_error(ctx, target, source))
    }
}

/// Writes a POD result back into the target's cell, converted to the
/// target's own numeric type.
fn store_numeric(target: &BoxedValue, result: PodView) -> Result<(), Exception> {
    let id = target.type_info().id();
    if id == TypeId::of::<bool>() {
        return target.with_mut::<bool, _>(|t| *t = result.truthy());
    }
    if id == TypeId::of::<char>() {
        let code = u32::try_from(result.as_i64()).ok().and_then(char::from_u32);
        return match code {
            Some(c) => target.with_mut::<char, _>(|t| *t = c),
            None => Err(Exception::eval("value is not a valid character")),
        };
    }

    macro_rules! store_int {
        ($($ty:ty),*) => {
            $(
                if id == TypeId::of::<$ty>() {
                    return target.with_mut::<$ty, _>(|t| *t = result.as_i64() as $ty);
                }
            )*
        };
    }
    store_int!(i64, i32, i16, i8, u64, u32, u16, u8, isize, usize);

    if id == TypeId::of::<f64>() {
        return target.with_mut::<f64, _>(|t| *t = result.as_f64());
    }
    if id == TypeId::of::<f32>() {
        return target.with_mut::<f32, _>(|t| *t = result.as_f64() as f32);
    }
    Err(Exception::eval("assignment target is not numeric"))
}

pub(crate) fn install(engine: &Engine) {
    engine.add_overload("=", AssignFn::new(AssignOp::Set));
    engine.add_overload("+=", AssignFn::new(AssignOp::Add));
    engine.add_overload("-=", AssignFn::new(AssignOp::Sub));
    engine.add_overload("*=", AssignFn::new(AssignOp::Mul));
    engine.add_overload("/=", AssignFn::new(AssignOp::Div));
}
