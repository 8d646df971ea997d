//! 模块自动发现的集成测试
//!
//! 模块提供者注册表是进程级的，因此与其他集成测试分开放在独立的测试二进制中。

use di_abstractions::{
    BeanDefinition, DiContainer, DiContainerExt, Event, ListenerDefinition, Module, ModuleContribution,
};
use infrastructure_common::{Capability, DependencyError, TypeDescriptor};
use infrastructure_composition::{register_module_provider, ContainerBuilder};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// 测试组件
#[derive(Debug)]
struct Named(&'static str);

struct Ping;

impl Event for Ping {
    fn event_type(&self) -> TypeDescriptor {
        TypeDescriptor::named("Ping")
    }
}

static PINGS: Lazy<Mutex<Vec<&'static str>>> = Lazy::new(|| Mutex::new(Vec::new()));

fn named_bean(name: &'static str) -> BeanDefinition {
    BeanDefinition::typed(name, Capability::named(name), move |_, _| Ok(Named(name)))
}

fn ping_listener(name: &'static str) -> ListenerDefinition {
    ListenerDefinition::new(name, TypeDescriptor::named("Ping"), move |_, _| {
        PINGS.lock().push(name);
        Ok(())
    })
}

fn discovered_module() -> Box<dyn Module> {
    Box::new(
        ModuleContribution::new("discovered")
            .with_priority(5)
            .with_bean(named_bean("discovered-bean"))
            .with_listener(ping_listener("discovered"))
            .with_bean_filter(|_, bean| bean.name() != "vetoed-by-discovered"),
    )
}

#[test]
fn test_auto_discovery_merges_discovered_and_registered_modules() {
    register_module_provider(discovered_module);

    let manual = ModuleContribution::new("manual")
        .with_priority(10)
        .with_bean(named_bean("vetoed-by-discovered"))
        .with_bean(named_bean("vetoed-by-manual"))
        .with_bean(named_bean("kept"))
        .with_listener(ping_listener("manual"))
        .with_bean_filter(|_, bean| bean.name() != "vetoed-by-manual");

    let container = ContainerBuilder::new().register_module(manual).build().unwrap();

    let discovered = container
        .lookup_as::<Named>(&Capability::named("discovered-bean"))
        .unwrap();
    assert_eq!(discovered.0, "discovered-bean");
    assert_eq!(
        container.lookup_as::<Named>(&Capability::named("kept")).unwrap().0,
        "kept"
    );

    for vetoed in ["vetoed-by-discovered", "vetoed-by-manual"] {
        let error = container.lookup(&Capability::named(vetoed)).unwrap_err();
        assert!(matches!(error, DependencyError::NotFound { .. }));
    }

    container.fire(&Ping).unwrap();
    assert_eq!(*PINGS.lock(), vec!["discovered", "manual"]);

    container.close().unwrap();
}
