//! Catalog of the models compiled into the library.
//!
//! The catalog is populated on first use and never changes afterwards, so descriptors can be
//! handed out as `&'static` and read from any thread.
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::Error;
use crate::RigCaps;
use crate::RigModel;

static REGISTRY: Lazy<BTreeMap<RigModel, RigCaps>> = Lazy::new(|| {
    #[allow(unused_mut)]
    let mut models = BTreeMap::new();
    #[cfg(feature = "dummy")]
    register(&mut models, crate::impls::dummy::caps());
    #[cfg(feature = "armstrong")]
    register(&mut models, crate::impls::armstrong::caps());
    log::debug!("registered {} rig models", models.len());
    models
});

#[allow(dead_code)]
fn register(models: &mut BTreeMap<RigModel, RigCaps>, caps: RigCaps) {
    if models.contains_key(&caps.model) {
        log::warn!("model {} registered twice, keeping the first", caps.model);
        return;
    }
    models.insert(caps.model, caps);
}

/// Descriptor of `model`.
pub fn lookup(model: RigModel) -> Result<&'static RigCaps, Error> {
    REGISTRY.get(&model).ok_or(Error::UnknownModel)
}

/// All registered descriptors, ordered by model number.
pub fn models() -> impl Iterator<Item = &'static RigCaps> {
    REGISTRY.values()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model() {
        assert_eq!(lookup(RigModel::NONE).err(), Some(Error::UnknownModel));
        assert_eq!(lookup(RigModel::make(99, 1)).err(), Some(Error::UnknownModel));
    }

    #[cfg(all(feature = "dummy", feature = "armstrong"))]
    #[test]
    fn registered_models() {
        let models: Vec<_> = models().map(|c| c.model).collect();
        assert_eq!(models, vec![RigModel::DUMMY, RigModel::ARMSTRONG]);
        let caps = lookup(RigModel::DUMMY).unwrap();
        assert_eq!(caps.model_name, "Dummy");
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn concurrent_lookup() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| lookup(RigModel::DUMMY).map(|c| c.model)))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Ok(RigModel::DUMMY));
        }
    }
}
