//! Regions plugin running on top of the people plugin.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use nucleus_core::{
    ComponentId, ContractError, ContractErrorKind, EventFilter, Plugin, PluginId, Simulation,
    SimulationBuilder,
};
use nucleus_people::{
    ContextPeopleExt, PeopleDataManager, PeoplePluginData, PersonConstructionData,
    PersonImminentAdditionEvent, people_plugin,
};
use nucleus_regions::{
    ContextRegionsExt, PersonRegionUpdateEvent, REGIONS_PLUGIN_ID, RegionAdditionEvent,
    RegionPropertyUpdateEvent, RegionsDataManager, RegionsPluginData, regions_plugin,
};
use nucleus_types::{PersonId, PropertyDefinition, PropertyId, PropertyValue, RegionId, ValueType};

const OBSERVER: PluginId = PluginId::new("observer");
const LISTENER: ComponentId = ComponentId::new(1_000);

type Moves = Rc<RefCell<Vec<(PersonId, RegionId, RegionId)>>>;

const fn r(index: usize) -> RegionId {
    RegionId::new(index)
}

const fn p(index: usize) -> PersonId {
    PersonId::new(index)
}

fn in_region(region: RegionId) -> PersonConstructionData {
    PersonConstructionData::new().with_value(region)
}

fn elevation() -> PropertyId {
    PropertyId::new("elevation")
}

fn simulation_with(people: PeoplePluginData, regions: RegionsPluginData) -> Simulation {
    let mut simulation = SimulationBuilder::new()
        .add_plugin(regions_plugin(regions))
        .add_plugin(people_plugin(people))
        .build()
        .unwrap();
    simulation.initialize().unwrap();
    simulation
}

fn empty_simulation() -> Simulation {
    simulation_with(PeoplePluginData::default(), RegionsPluginData::default())
}

fn record_moves(
    simulation: &mut Simulation,
    filter: EventFilter<PersonRegionUpdateEvent>,
) -> Moves {
    let moves: Moves = Rc::default();
    let sink = Rc::clone(&moves);
    simulation
        .context_mut()
        .subscribe(LISTENER, filter, move |_ctx, e: &PersonRegionUpdateEvent| {
            sink.borrow_mut()
                .push((e.person, e.previous_region, e.current_region));
            Ok(())
        })
        .unwrap();
    moves
}

#[test]
fn person_moves_between_regions() {
    let mut simulation = empty_simulation();
    let context = simulation.context_mut();
    context.add_region(r(1), BTreeMap::new()).unwrap();
    let person = context.add_person(in_region(r(1))).unwrap();
    assert_eq!(person, p(0));
    assert_eq!(context.people_in_region(r(1)).unwrap(), vec![p(0)]);

    context.add_region(r(2), BTreeMap::new()).unwrap();
    let moves = record_moves(&mut simulation, EventFilter::all());
    let context = simulation.context_mut();
    context.set_person_region(p(0), r(2)).unwrap();

    assert!(context.people_in_region(r(1)).unwrap().is_empty());
    assert_eq!(context.people_in_region(r(2)).unwrap(), vec![p(0)]);
    assert_eq!(context.person_region(p(0)).unwrap(), r(2));
    assert_eq!(*moves.borrow(), vec![(p(0), r(1), r(2))]);
}

#[test]
fn no_update_event_without_subscribers() {
    let mut simulation = empty_simulation();
    let context = simulation.context_mut();
    context.add_region(r(1), BTreeMap::new()).unwrap();
    context.add_region(r(2), BTreeMap::new()).unwrap();
    context.add_person(in_region(r(1))).unwrap();

    let before = context.released_observation_count();
    context.set_person_region(p(0), r(2)).unwrap();
    assert_eq!(context.released_observation_count(), before);
    assert_eq!(context.people_in_region(r(2)).unwrap(), vec![p(0)]);
}

#[test]
fn moving_to_the_same_region_is_silent() {
    let mut simulation = simulation_with(
        PeoplePluginData::with_person_count(1),
        RegionsPluginData::builder()
            .add_region(r(1))
            .set_person_region(p(0), r(1))
            .build()
            .unwrap(),
    );
    let moves = record_moves(&mut simulation, EventFilter::all());
    let context = simulation.context_mut();
    context.set_person_region(p(0), r(1)).unwrap();
    assert!(moves.borrow().is_empty());
    assert_eq!(context.people_in_region(r(1)).unwrap(), vec![p(0)]);
}

#[test]
fn keyed_filters_route_by_region_and_person() {
    let data = RegionsPluginData::builder()
        .add_region(r(1))
        .add_region(r(2))
        .add_region(r(3))
        .set_person_region(p(0), r(1))
        .set_person_region(p(1), r(1))
        .build()
        .unwrap();
    let mut simulation = simulation_with(PeoplePluginData::with_person_count(2), data);

    let filter =
        PersonRegionUpdateEvent::filter_by_arrival_region(simulation.context(), r(2)).unwrap();
    let arrivals = record_moves(&mut simulation, filter);
    let filter = PersonRegionUpdateEvent::filter_by_person(simulation.context(), p(1)).unwrap();
    let moves = Rc::clone(&arrivals);
    simulation
        .context_mut()
        .subscribe(LISTENER, filter, move |_ctx, e: &PersonRegionUpdateEvent| {
            moves.borrow_mut()
                .push((e.person, e.previous_region, e.current_region));
            Ok(())
        })
        .unwrap();

    let context = simulation.context_mut();
    context.set_person_region(p(0), r(2)).unwrap();
    context.set_person_region(p(0), r(3)).unwrap();
    context.set_person_region(p(1), r(2)).unwrap();
    assert_eq!(
        *arrivals.borrow(),
        vec![(p(0), r(1), r(2)), (p(1), r(1), r(2))]
    );
}

#[test]
fn filters_on_unknown_ids_are_rejected() {
    let simulation = empty_simulation();
    let context = simulation.context();
    let err = PersonRegionUpdateEvent::filter_by_arrival_region(context, r(9)).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::UnknownRegionId);
    let err = PersonRegionUpdateEvent::filter_by_person(context, p(0)).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::UnknownPersonId);
    let err = RegionPropertyUpdateEvent::filter_by_property(context, &elevation()).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::UnknownPropertyId);
}

#[test]
fn person_addition_requires_a_known_region() {
    let mut simulation = empty_simulation();
    let context = simulation.context_mut();
    context.add_region(r(1), BTreeMap::new()).unwrap();

    let err = context.add_person(PersonConstructionData::new()).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::MissingConstructionData);
    let err = context.add_person(in_region(r(5))).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::UnknownRegionId);
    assert_eq!(context.population_count().unwrap(), 0);

    let person = context.add_person(in_region(r(1))).unwrap();
    context.remove_person(person).unwrap();
    assert!(context.people_in_region(r(1)).unwrap().is_empty());
    assert_eq!(
        context.set_person_region(person, r(1)).unwrap_err().kind(),
        ContractErrorKind::UnknownPersonId
    );
}

#[test]
fn initial_people_must_all_be_placed() {
    let err = SimulationBuilder::new()
        .add_plugin(people_plugin(PeoplePluginData::with_person_count(2)))
        .add_plugin(regions_plugin(
            RegionsPluginData::builder()
                .add_region(r(1))
                .set_person_region(p(0), r(1))
                .build()
                .unwrap(),
        ))
        .build()
        .unwrap()
        .initialize()
        .unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::InsufficientDefaultCoverage);
}

#[derive(Debug, Clone, Copy)]
struct Veto;

/// A plugin whose actor rejects every addition carrying `Veto`.
fn vetoing_observer() -> Plugin {
    Plugin::builder(OBSERVER)
        .dependency(REGIONS_PLUGIN_ID)
        .initializer(|plugin| {
            plugin.add_actor(|context, id| {
                context.subscribe(
                    id,
                    EventFilter::all(),
                    |_ctx, e: &PersonImminentAdditionEvent| {
                        if e.construction.value::<Veto>().is_some() {
                            return Err(ContractError::new(
                                ContractErrorKind::MissingConstructionData,
                            ));
                        }
                        Ok(())
                    },
                )
            });
            Ok(())
        })
        .build()
}

#[test]
fn vetoed_addition_leaves_no_placement() {
    let mut simulation = SimulationBuilder::new()
        .add_plugin(vetoing_observer())
        .add_plugin(people_plugin(PeoplePluginData::default()))
        .add_plugin(regions_plugin(RegionsPluginData::default()))
        .build()
        .unwrap();
    simulation.initialize().unwrap();
    let context = simulation.context_mut();
    context.add_region(r(1), BTreeMap::new()).unwrap();
    context.add_region(r(2), BTreeMap::new()).unwrap();

    let err = context
        .add_person(in_region(r(1)).with_value(Veto))
        .unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::MissingConstructionData);
    assert_eq!(context.population_count().unwrap(), 0);
    assert!(!context.person_exists(p(0)).unwrap());
    assert!(context.people_in_region(r(1)).unwrap().is_empty());
    assert_eq!(
        context.person_region(p(0)).unwrap_err().kind(),
        ContractErrorKind::UnknownPersonId
    );

    let people = context.data_manager::<PeopleDataManager>().unwrap().to_plugin_data();
    let regions = context
        .data_manager::<RegionsDataManager>()
        .unwrap()
        .to_plugin_data()
        .unwrap();
    assert!(regions.person_regions().is_empty());
    let restored = simulation_with(people, regions);
    assert_eq!(restored.context().population_count().unwrap(), 0);

    // The retracted id goes to the next addition, placed only where it asked.
    let context = simulation.context_mut();
    assert_eq!(context.add_person(in_region(r(2))).unwrap(), p(0));
    assert!(context.people_in_region(r(1)).unwrap().is_empty());
    assert_eq!(context.people_in_region(r(2)).unwrap(), vec![p(0)]);
    assert_eq!(context.person_region(p(0)).unwrap(), r(2));
}

#[test]
fn region_properties_update_and_guard_values() {
    let data = RegionsPluginData::builder()
        .add_region(r(1))
        .define_property(
            elevation(),
            PropertyDefinition::builder(ValueType::Double)
                .default_value(0.0)
                .build()
                .unwrap(),
        )
        .define_property(
            PropertyId::new("name"),
            PropertyDefinition::builder(ValueType::Text)
                .immutable()
                .build()
                .unwrap(),
        )
        .set_region_property_value(
            r(1),
            PropertyId::new("name"),
            PropertyValue::Text("north".into()),
        )
        .build()
        .unwrap();
    let mut simulation = simulation_with(PeoplePluginData::default(), data);

    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    let filter = RegionPropertyUpdateEvent::filter_by_region_and_property(
        simulation.context(),
        r(1),
        &elevation(),
    )
    .unwrap();
    let context = simulation.context_mut();
    context
        .subscribe(LISTENER, filter, move |_ctx, e: &RegionPropertyUpdateEvent| {
            sink.borrow_mut().push((e.previous_value.clone(), e.current_value.clone()));
            Ok(())
        })
        .unwrap();

    context.set_region_property_value(r(1), elevation(), 120.5).unwrap();
    assert_eq!(
        context.region_property_value(r(1), &elevation()).unwrap(),
        PropertyValue::Double(120.5)
    );
    assert_eq!(
        *updates.borrow(),
        vec![(PropertyValue::Double(0.0), PropertyValue::Double(120.5))]
    );

    let err = context
        .set_region_property_value(
            r(1),
            PropertyId::new("name"),
            PropertyValue::Text("south".into()),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::ImmutableValue);
    let err = context
        .set_region_property_value(r(1), elevation(), true)
        .unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::IncompatibleValue);

    // A new region must supply the text property, which has no default.
    let err = context.add_region(r(2), BTreeMap::new()).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::InsufficientDefaultCoverage);
    let values = BTreeMap::from([(PropertyId::new("name"), PropertyValue::Text("east".into()))]);
    context.add_region(r(2), values).unwrap();
    assert_eq!(
        context.region_property_value(r(2), &elevation()).unwrap(),
        PropertyValue::Double(0.0)
    );
}

#[test]
fn defining_a_property_covers_existing_regions() {
    let mut simulation = empty_simulation();
    let context = simulation.context_mut();
    context.add_region(r(1), BTreeMap::new()).unwrap();
    context.add_region(r(4), BTreeMap::new()).unwrap();

    let no_default = PropertyDefinition::builder(ValueType::Int).build().unwrap();
    let err = context
        .define_region_property(
            elevation(),
            no_default.clone(),
            BTreeMap::from([(r(1), PropertyValue::Int(3))]),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::InsufficientDefaultCoverage);

    context
        .define_region_property(
            elevation(),
            no_default.clone(),
            BTreeMap::from([(r(1), PropertyValue::Int(3)), (r(4), PropertyValue::Int(300))]),
        )
        .unwrap();
    assert_eq!(
        context.region_property_value(r(4), &elevation()).unwrap(),
        PropertyValue::Int(300)
    );
    let err = context
        .define_region_property(elevation(), no_default, BTreeMap::new())
        .unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::DuplicatePropertyDefinition);
}

#[test]
fn observer_plugin_sees_region_additions() {
    let added = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&added);
    let observer = Plugin::builder(OBSERVER)
        .dependency(REGIONS_PLUGIN_ID)
        .initializer(move |plugin| {
            plugin.add_actor(move |context, id| {
                context.subscribe(id, EventFilter::all(), move |_ctx, e: &RegionAdditionEvent| {
                    sink.borrow_mut().push(e.region);
                    Ok(())
                })
            });
            Ok(())
        })
        .build();
    let mut simulation = SimulationBuilder::new()
        .add_plugin(observer)
        .add_plugin(people_plugin(PeoplePluginData::default()))
        .add_plugin(regions_plugin(RegionsPluginData::default()))
        .build()
        .unwrap();
    assert_eq!(
        simulation.plugin_order(),
        &[PluginId::new("people"), REGIONS_PLUGIN_ID, OBSERVER]
    );
    simulation.initialize().unwrap();

    let context = simulation.context_mut();
    context.add_region(r(7), BTreeMap::new()).unwrap();
    let err = context.add_region(r(7), BTreeMap::new()).unwrap_err();
    assert_eq!(err.kind(), ContractErrorKind::DuplicateRegionId);
    assert_eq!(*added.borrow(), vec![r(7)]);
}

#[test]
fn snapshot_restores_the_same_state() {
    let mut simulation = simulation_with(
        PeoplePluginData::with_person_count(3),
        RegionsPluginData::builder()
            .add_region(r(1))
            .add_region(r(2))
            .define_property(
                elevation(),
                PropertyDefinition::builder(ValueType::Double)
                    .default_value(1.0)
                    .build()
                    .unwrap(),
            )
            .set_person_region(p(0), r(1))
            .set_person_region(p(1), r(1))
            .set_person_region(p(2), r(2))
            .build()
            .unwrap(),
    );
    let context = simulation.context_mut();
    context.set_person_region(p(1), r(2)).unwrap();
    context.set_region_property_value(r(2), elevation(), 9.5).unwrap();

    let people = context.data_manager::<PeopleDataManager>().unwrap().to_plugin_data();
    let regions = context
        .data_manager::<RegionsDataManager>()
        .unwrap()
        .to_plugin_data()
        .unwrap();
    let json = serde_json::to_string(&regions).unwrap();
    let restored: RegionsPluginData = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, regions);

    let copy = simulation_with(people, restored);
    let context = copy.context();
    assert_eq!(context.people_in_region(r(1)).unwrap(), vec![p(0)]);
    assert_eq!(context.people_in_region(r(2)).unwrap(), vec![p(1), p(2)]);
    assert_eq!(
        context.region_property_value(r(2), &elevation()).unwrap(),
        PropertyValue::Double(9.5)
    );
    assert_eq!(
        context.region_property_value(r(1), &elevation()).unwrap(),
        PropertyValue::Double(1.0)
    );
}

#[test]
fn plugin_data_loads_from_yaml() {
    let yaml = r"
regions: [1, 2]
property_definitions:
  elevation:
    value_type: Double
    default_value: !Double 0.0
property_values:
  2:
    elevation: !Double 850.0
person_regions:
  0: 2
";
    let data: RegionsPluginData = serde_yml::from_str(yaml).unwrap();
    data.validate().unwrap();
    let simulation = simulation_with(PeoplePluginData::with_person_count(1), data);
    let context = simulation.context();
    assert_eq!(context.person_region(p(0)).unwrap(), r(2));
    assert_eq!(
        context.region_property_value(r(2), &elevation()).unwrap(),
        PropertyValue::Double(850.0)
    );
}
