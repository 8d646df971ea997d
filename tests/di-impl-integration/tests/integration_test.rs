//! 依赖注入运行时的集中集成测试

use di_abstractions::{
    BeanDefinition, DiContainer, DiContainerExt, Event, Instance, InstanceHandle, ListenerDefinition,
    ModuleContribution, Scope, Start, Stop,
};
use di_impl::{IocContainer, PerLookupScope, SingletonScope};
use infrastructure_common::{
    Capability, DependencyError, DependencyResult, LifecycleState, ScopeMarker, TypeDescriptor,
};
use infrastructure_composition::ContainerBuilder;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 测试组件
#[derive(Debug)]
struct Named(&'static str);

fn iface() -> TypeDescriptor {
    TypeDescriptor::named("IFace")
}

fn named_bean(name: &'static str, provides: Capability, priority: i32) -> BeanDefinition {
    BeanDefinition::typed(name, provides, move |_, _| Ok(Named(name))).with_priority(priority)
}

fn bare_container() -> IocContainer {
    let container = IocContainer::new();
    container.register_scopes(vec![
        Arc::new(SingletonScope::new()) as Arc<dyn Scope>,
        Arc::new(PerLookupScope::new()) as Arc<dyn Scope>,
    ]);
    container
}

fn manual_container(module: ModuleContribution) -> IocContainer {
    ContainerBuilder::new()
        .disable_auto_discovery()
        .register_module(module)
        .build()
        .unwrap()
}

#[test]
fn test_single_bean_round_trip() {
    let container = manual_container(
        ModuleContribution::new("round-trip")
            .with_bean(named_bean("only", Capability::named("Only"), 1)),
    );

    let bean = container.lookup_as::<Named>(&Capability::named("Only")).unwrap();
    assert_eq!(bean.0, "only");
    assert_eq!(bean.handle().bean().unwrap().name(), "only");

    container.close().unwrap();
}

#[test]
fn test_priority_scenario_then_tie_is_ambiguous() {
    let container = bare_container();
    let capability = Capability::Plain(iface());

    container.register_beans(vec![
        named_bean("BeanA", capability.clone(), 2000),
        named_bean("BeanB", capability.clone(), 1000),
    ]);
    for _ in 0..3 {
        let bean = container.lookup_as::<Named>(&capability).unwrap();
        assert_eq!(bean.0, "BeanA");
    }

    container.register_beans(vec![
        named_bean("BeanA", capability.clone(), 1000),
        named_bean("BeanB", capability.clone(), 1000),
    ]);
    match container.lookup(&capability) {
        Err(DependencyError::Ambiguous { candidates, .. }) => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().any(|c| c.starts_with("BeanA")));
            assert!(candidates.iter().any(|c| c.starts_with("BeanB")));
        }
        other => panic!("期望歧义错误，实际: {:?}", other),
    }
}

#[test]
fn test_optional_lookup_never_raises_not_found() {
    let container = manual_container(ModuleContribution::new("empty"));

    let handle = container
        .lookup(&Capability::optional(Capability::named("Unregistered")))
        .unwrap();
    assert!(!handle.is_present());
    handle.close(&container).unwrap();

    let typed = container
        .lookup_optional_as::<Named>(&Capability::named("Unregistered"))
        .unwrap();
    assert!(typed.is_none());

    let error = container.lookup(&Capability::named("Unregistered")).unwrap_err();
    assert!(matches!(error, DependencyError::NotFound { .. }));
}

#[test]
fn test_optional_lookup_of_registered_bean_is_present() {
    let container = manual_container(
        ModuleContribution::new("optional")
            .with_bean(named_bean("present", Capability::named("Present"), 1)),
    );

    let bean = container
        .lookup_optional_as::<Named>(&Capability::named("Present"))
        .unwrap()
        .unwrap();
    assert_eq!(bean.0, "present");
}

#[test]
fn test_lookups_order_and_cache_reuse() {
    let plugin = Capability::named("Plugin");
    let container = manual_container(
        ModuleContribution::new("plugins")
            .with_bean(named_bean("beta", plugin.clone(), 5))
            .with_bean(named_bean("alpha", plugin.clone(), 5))
            .with_bean(named_bean("top", plugin.clone(), 9))
            .with_bean(named_bean("low", plugin.clone(), 1)),
    );

    let (plugins, handle) = container.lookup_list_as::<Named>(&plugin).unwrap();
    let names: Vec<&str> = plugins.iter().map(|p| p.0).collect();
    assert_eq!(names, vec!["top", "alpha", "beta", "low"]);
    assert!(handle.bean().is_none());
    assert_eq!(handle.dependent_count(), 4);
    assert_eq!(container.stats().list_cache_entries, 1);

    let (again, _) = container.lookup_list_as::<Named>(&plugin).unwrap();
    assert_eq!(again.len(), 4);
    assert_eq!(container.stats().list_cache_entries, 1);

    handle.close(&container).unwrap();
}

#[test]
fn test_lookups_combiner_receives_ordered_values() {
    let plugin = Capability::named("Plugin");
    let container = bare_container();
    container.register_beans(vec![
        named_bean("second", plugin.clone(), 1),
        named_bean("first", plugin.clone(), 2),
    ]);

    let handle = container
        .lookups(&plugin, &|values| {
            let joined: Vec<&'static str> = values
                .iter()
                .filter_map(|value| value.downcast_ref::<Named>().map(|named| named.0))
                .collect();
            Arc::new(joined.join(",")) as Instance
        })
        .unwrap();

    assert_eq!(handle.downcast::<String>().unwrap().as_str(), "first,second");
}

#[test]
fn test_dependent_close_failure_is_aggregated() {
    let closed = Arc::new(Mutex::new(Vec::new()));
    let (d1_log, d2_log) = (Arc::clone(&closed), Arc::clone(&closed));

    let container = bare_container();
    container.register_beans(vec![
        named_bean("d1", Capability::named("D1"), 1).with_destroy(move |_, _| {
            d1_log.lock().push("d1");
            Ok(())
        }),
        named_bean("d2", Capability::named("D2"), 1).with_destroy(move |_, _| {
            d2_log.lock().push("d2");
            anyhow::bail!("d2 关闭失败")
        }),
    ]);

    let parent = InstanceHandle::shared(Arc::new(Named("parent")));
    parent.add_dependent(container.lookup(&Capability::named("D1")).unwrap());
    parent.add_dependent(container.lookup(&Capability::named("D2")).unwrap());

    let error = parent.close(&container).unwrap_err();

    assert_eq!(*closed.lock(), vec!["d1", "d2"]);
    assert_eq!(error.causes().len(), 1);
    assert!(format!("{:#}", error.causes()[0]).contains("d2"));
    assert_eq!(parent.dependent_count(), 0);
}

#[derive(Debug)]
struct OrderPlaced;

impl OrderPlaced {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::named("OrderPlaced").extends(TypeDescriptor::named("DomainEvent"))
    }
}

impl Event for OrderPlaced {
    fn event_type(&self) -> TypeDescriptor {
        Self::descriptor()
    }
}

#[test]
fn test_supertype_listener_fires_once_in_priority_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (second, first) = (Arc::clone(&calls), Arc::clone(&calls));

    let container = manual_container(
        ModuleContribution::new("listeners")
            .with_listener(
                ListenerDefinition::new("on-domain", TypeDescriptor::named("DomainEvent"), move |_, _| {
                    second.lock().push(2);
                    Ok(())
                })
                .with_priority(2),
            )
            .with_listener(
                ListenerDefinition::typed::<OrderPlaced, _>(
                    "on-order",
                    OrderPlaced::descriptor(),
                    move |_, _| {
                        first.lock().push(1);
                        Ok(())
                    },
                )
                .with_priority(1),
            ),
    );

    container.fire(&OrderPlaced).unwrap();
    assert_eq!(*calls.lock(), vec![1, 2]);
}

#[test]
fn test_emitter_bean_dispatches_to_listeners() {
    let received = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&received);

    let container = manual_container(ModuleContribution::new("emitting").with_listener(
        ListenerDefinition::new("on-order", OrderPlaced::descriptor(), move |_, _| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }),
    ));

    let emitter = container.lookup_type::<di_abstractions::Emitter>().unwrap();
    emitter.emit(&OrderPlaced).unwrap();

    assert!(received.load(Ordering::SeqCst));
    container.close().unwrap();
}

#[test]
fn test_start_event_fires_only_with_direct_listener() {
    let started = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&started);

    let container = manual_container(ModuleContribution::new("startup").with_listener(
        ListenerDefinition::typed::<Start, _>("on-start", Start::descriptor(), move |container, _| {
            assert_eq!(container.state(), LifecycleState::Running);
            flag.store(true, Ordering::SeqCst);
            Ok(())
        }),
    ));

    assert!(started.load(Ordering::SeqCst));
    container.close().unwrap();
}

#[test]
fn test_failing_start_listener_aborts_boot() {
    let result = ContainerBuilder::new()
        .disable_auto_discovery()
        .register_module(ModuleContribution::new("bad-start").with_listener(
            ListenerDefinition::new("on-start", Start::descriptor(), |_, _| {
                anyhow::bail!("启动失败")
            }),
        ))
        .build();

    assert!(result.is_err());
}

/// 关闭时失败的自定义作用域
struct FailingScope {
    close_attempted: Arc<AtomicBool>,
}

impl Scope for FailingScope {
    fn marker(&self) -> ScopeMarker {
        ScopeMarker::new("failing")
    }

    fn name(&self) -> &str {
        "FailingScope"
    }

    fn get_or_create(
        &self,
        container: &dyn DiContainer,
        bean: &Arc<BeanDefinition>,
    ) -> DependencyResult<InstanceHandle> {
        InstanceHandle::realize(bean, container)
    }

    fn is_closeable(&self) -> bool {
        true
    }

    fn close(&self, _container: &dyn DiContainer) -> anyhow::Result<()> {
        self.close_attempted.store(true, Ordering::SeqCst);
        anyhow::bail!("作用域关闭失败")
    }
}

#[test]
fn test_close_aggregates_listener_and_scope_failures() {
    let close_attempted = Arc::new(AtomicBool::new(false));

    let container = manual_container(
        ModuleContribution::new("teardown")
            .with_scope(Arc::new(FailingScope {
                close_attempted: Arc::clone(&close_attempted),
            }))
            .with_listener(ListenerDefinition::typed::<Stop, _>(
                "on-stop",
                Stop::descriptor(),
                |_, _| anyhow::bail!("停止监听器失败"),
            )),
    );

    let error = container.close().unwrap_err();

    assert_eq!(error.causes().len(), 2);
    assert!(close_attempted.load(Ordering::SeqCst));
    assert_eq!(container.state(), LifecycleState::Stopped);
    assert!(container.close().is_ok());
}

#[test]
fn test_scope_filter_vetoes_contributed_scope() {
    let close_attempted = Arc::new(AtomicBool::new(false));

    let container = manual_container(
        ModuleContribution::new("filtered")
            .with_scope(Arc::new(FailingScope {
                close_attempted: Arc::clone(&close_attempted),
            }))
            .with_scope_filter(|_, scope| scope.name() != "FailingScope")
            .with_bean(
                named_bean("scoped", Capability::named("Scoped"), 1)
                    .with_scope(ScopeMarker::new("failing")),
            ),
    );

    let error = container.lookup(&Capability::named("Scoped")).unwrap_err();
    assert!(matches!(error, DependencyError::MissingScope { .. }));

    container.close().unwrap();
    assert!(!close_attempted.load(Ordering::SeqCst));
}

#[test]
fn test_modules_are_ordered_by_priority() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (late_log, early_log) = (Arc::clone(&order), Arc::clone(&order));
    let event = TypeDescriptor::named("Ping");

    struct Ping;
    impl Event for Ping {
        fn event_type(&self) -> TypeDescriptor {
            TypeDescriptor::named("Ping")
        }
    }

    let container = ContainerBuilder::new()
        .disable_auto_discovery()
        .register_module(ModuleContribution::new("late").with_priority(20).with_listener(
            ListenerDefinition::new("late", event.clone(), move |_, _| {
                late_log.lock().push("late");
                Ok(())
            }),
        ))
        .register_module(ModuleContribution::new("early").with_priority(10).with_listener(
            ListenerDefinition::new("early", event, move |_, _| {
                early_log.lock().push("early");
                Ok(())
            }),
        ))
        .build()
        .unwrap();

    container.fire(&Ping).unwrap();
    assert_eq!(*order.lock(), vec!["early", "late"]);
}
