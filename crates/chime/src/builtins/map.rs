//! The script `Map` container: an insertion-ordered string-keyed mapping.

use indexmap::IndexMap;

use crate::{
    dispatch::NativeFn,
    engine::Engine,
    exception::Exception,
    value::{BoxedValue, TypeInfo},
};

/// Insertion-ordered mapping from string keys to boxed values, the backing
/// type of inline `[k: v, ...]` literals.
///
/// Lookup of a missing key is an error; `insert` is the write path. Like
/// `Vector`, cloning copies the entry list but shares the entry cells.
#[derive(Debug, Clone, Default)]
pub struct Map(pub IndexMap<String, BoxedValue>);

pub(crate) fn install(engine: &Engine) {
    engine.add_overload("Map", NativeFn::new(vec![], |_, _| Ok(BoxedValue::new(Map::default()))));

    engine.add_overload(
        "insert",
        NativeFn::new(
            vec![TypeInfo::of::<Map>(), TypeInfo::of::<String>(), TypeInfo::void()],
            |_, args| {
                let key = args[1].clone_as::<String>()?;
                let value = args[2].clone();
                args[0].with_mut::<Map, _>(|m| m.0.insert(key, value))?;
                Ok(BoxedValue::void())
            },
        ),
    );

    engine.add_overload(
        "size",
        NativeFn::new(vec![TypeInfo::of::<Map>()], |_, args| {
            let size = args[0].with_ref::<Map, _>(|m| m.0.len())?;
            Ok(BoxedValue::new(size as i64))
        }),
    );

    engine.add_overload(
        "[]",
        NativeFn::new(vec![TypeInfo::of::<Map>(), TypeInfo::of::<String>()], |_, args| {
            let key = args[1].clone_as::<String>()?;
            args[0]
                .with_ref::<Map, _>(|m| m.0.get(&key).cloned())?
                .map_or_else(|| Err(Exception::eval(format!("map has no entry for key '{key}'"))), Ok)
        }),
    );

    engine.add_overload(
        "contains",
        NativeFn::new(vec![TypeInfo::of::<Map>(), TypeInfo::of::<String>()], |_, args| {
            let key = args[1].clone_as::<String>()?;
            let present = args[0].with_ref::<Map, _>(|m| m.0.contains_key(&key))?;
            Ok(BoxedValue::new(present))
        }),
    );

    engine.add_overload(
        "clone",
        NativeFn::new(vec![TypeInfo::of::<Map>()], |_, args| {
            Ok(BoxedValue::new(args[0].clone_as::<Map>()?))
        }),
    );
}
