//! Arithmetic and comparison over the numeric primitives, via the POD view.
//!
//! The overloads here declare void (wildcard) parameters but override
//! `matches` to accept only numeric arguments, so they coexist with
//! same-named overloads for other types regardless of registration order.

use std::cmp::Ordering;

use crate::{
    dispatch::{CallContext, Callable, NativeFn},
    engine::Engine,
    exception::Exception,
    pod::PodView,
    value::{BoxedValue, TypeInfo},
};

#[derive(Debug, Clone, Copy)]
enum PodOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// One binary arithmetic operator over any pair of numeric primitives.
struct PodBinary {
    op: PodOp,
    params: [TypeInfo; 2],
}

impl PodBinary {
    fn new(op: PodOp) -> Self {
        Self {
            op,
            params: [TypeInfo::void(), TypeInfo::void()],
        }
    }
}

impl Callable for PodBinary {
    fn arity(&self) -> usize {
        2
    }

    fn param_types(&self) -> &[TypeInfo] {
        &self.params
    }

    fn matches(&self, args: &[BoxedValue]) -> bool {
        args.len() == 2 && args.iter().all(PodView::supports)
    }

    fn invoke(&self, _ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception> {
        let a = PodView::from_boxed(&args[0])?;
        let b = PodView::from_boxed(&args[1])?;
        let result = match self.op {
            PodOp::Add => a.add(b)?,
            PodOp::Sub => a.sub(b)?,
            PodOp::Mul => a.mul(b)?,
            PodOp::Div => a.div(b)?,
        };
        Ok(result.rebox())
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// One comparison operator over any pair of numeric primitives.
struct PodComparison {
    op: CmpOp,
    params: [TypeInfo; 2],
}

impl PodComparison {
    fn new(op: CmpOp) -> Self {
        Self {
            op,
            params: [TypeInfo::void(), TypeInfo::void()],
        }
    }
}

impl Callable for PodComparison {
    fn arity(&self) -> usize {
        2
    }

    fn param_types(&self) -> &[TypeInfo] {
        &self.params
    }

    fn matches(&self, args: &[BoxedValue]) -> bool {
        args.len() == 2 && args.iter().all(PodView::supports)
    }

    fn invoke(&self, _ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception> {
        let a = PodView::from_boxed(&args[0])?;
        let b = PodView::from_boxed(&args[1])?;
        // NaN comparisons yield None: everything is false except `!=`.
        let ord = a.compare(b);
        let result = match self.op {
            CmpOp::Eq => ord == Some(Ordering::Equal),
            CmpOp::Ne => ord != Some(Ordering::Equal),
            CmpOp::Lt => ord == Some(Ordering::Less),
            CmpOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            CmpOp::Gt => ord == Some(Ordering::Greater),
            CmpOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        };
        Ok(BoxedValue::new(result))
    }
}

/// Prefix `-` and `+` over a single numeric primitive.
struct PodUnary {
    negate: bool,
    params: [TypeInfo; 1],
}

impl PodUnary {
    fn new(negate: bool) -> Self {
        Self {
            negate,
            params: [TypeInfo::void()],
        }
    }
}

impl Callable for PodUnary {
    fn arity(&self) -> usize {
        1
    }

    fn param_types(&self) -> &[TypeInfo] {
        &self.params
    }

    fn matches(&self, args: &[BoxedValue]) -> bool {
        args.len() == 1 && PodView::supports(&args[0])
    }

    fn invoke(&self, _ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception> {
        let value = PodView::from_boxed(&args[0])?;
        let result = if self.negate { value.neg() } else { value };
        Ok(result.rebox())
    }
}

pub(crate) fn install(engine: &Engine) {
    engine.add_overload("+", PodBinary::new(PodOp::Add));
    engine.add_overload("-", PodBinary::new(PodOp::Sub));
    engine.add_overload("*", PodBinary::new(PodOp::Mul));
    engine.add_overload("/", PodBinary::new(PodOp::Div));

    engine.add_overload("==", PodComparison::new(CmpOp::Eq));
    engine.add_overload("!=", PodComparison::new(CmpOp::Ne));
    engine.add_overload("<", PodComparison::new(CmpOp::Lt));
    engine.add_overload("<=", PodComparison::new(CmpOp::Le));
    engine.add_overload(">", PodComparison::new(CmpOp::Gt));
    engine.add_overload(">=", PodComparison::new(CmpOp::Ge));

    engine.add_overload("-", PodUnary::new(true));
    engine.add_overload("+", PodUnary::new(false));

    engine.add_overload(
        "&&",
        NativeFn::new(vec![TypeInfo::of::<bool>(), TypeInfo::of::<bool>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<bool>()? && args[1].clone_as::<bool>()?))
        }),
    );
    engine.add_overload(
        "||",
        NativeFn::new(vec![TypeInfo::of::<bool>(), TypeInfo::of::<bool>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<bool>()? || args[1].clone_as::<bool>()?))
        }),
    );
    engine.add_overload(
        "!",
        NativeFn::new(vec![TypeInfo::of::<bool>()], |_, args| {
            Ok(BoxedValue::new(!args[0].clone_as::<bool>()?))
        }),
    );

    // Width-preserving copies for value-semantics binding.
    macro_rules! register_clone {
        ($($ty:ty),*) => {
            $(
                engine.add_overload(
                    "clone",
                    NativeFn::new(vec![TypeInfo::of::<$ty>()], |_, args| {
                        Ok(BoxedValue::new(args[0].clone_as::<$ty>()?))
                    }),
                );
            )*
        };
    }
    register_clone!(i64, i32, i16, i8, u64, u32, u16, u8, isize, usize, f64, f32, bool, char);
}
