//! Integration tests for restoring transfer files onto scenes.

use poselib::naming::{match_names, strip_namespaces, with_namespace};
use poselib::prelude::*;

use tempfile::{tempdir, NamedTempFile};

fn curve(keys: &[(f64, f64)]) -> TypedValue {
    TypedValue::Curve(
        ValueType::Double,
        Curve::from_keys(keys.iter().map(|&(f, v)| Key::new(f, v))),
    )
}

fn keys_of(scene: &MemoryScene, path: &str, attr: &str) -> Vec<(f64, f64)> {
    scene
        .value(path, attr)
        .and_then(|v| v.as_curve().map(|c| c.keys().iter().map(|k| (k.frame, k.value)).collect()))
        .expect("attribute is not animated")
}

fn biped_table(mode: MirrorMode) -> MirrorTable {
    MirrorTable::new(
        [("L_".to_string(), "R_".to_string())],
        &["translateX", "rotateY", "rotateZ"],
        mode,
    )
    .expect("Failed to build mirror table")
}

#[test]
fn test_pose_restore_across_namespaces() {
    let source = MemoryScene::new().with("|char:L_arm", "rotateX", TypedValue::Double(10.0));
    let dest = MemoryScene::new().with("|char2:L_arm", "rotateX", TypedValue::Double(0.0));

    let nodes = [Node::new(&source, "|char:L_arm")];
    let pose = TransferObject::capture(TransferKind::Pose, &nodes, &AttributeFilter::All, None)
        .expect("Failed to capture");

    let temp = NamedTempFile::new().expect("Failed to create temp file");
    pose.save(temp.path()).expect("Failed to save");
    let pose = TransferObject::load(temp.path()).expect("Failed to load");

    let options = RestoreOptions::default().namespaces(&["char"], &["char2"]);
    let report = pose.restore(&dest, &options).expect("Failed to restore");

    assert_eq!(dest.value("|char2:L_arm", "rotateX"), Some(TypedValue::Double(10.0)));
    assert!(report.is_complete());
    assert_eq!(report.matches[0].method, Some(MatchMethod::Namespace));
}

#[test]
fn test_single_destination_namespace_takes_all() {
    let dest = MemoryScene::new()
        .with("|hero:L_arm", "rotateX", TypedValue::Double(0.0))
        .with("|hero:R_arm", "rotateX", TypedValue::Double(0.0));
    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|a:L_arm", "rotateX", TypedValue::Double(1.0)).unwrap();
    pose.insert("|b:R_arm", "rotateX", TypedValue::Double(2.0)).unwrap();

    let options = RestoreOptions::default().namespaces(&[] as &[&str], &["hero"]);
    let report = pose.restore(&dest, &options).unwrap();

    assert_eq!(report.resolved(), vec!["|hero:L_arm", "|hero:R_arm"]);
    assert_eq!(dest.value("|hero:R_arm", "rotateX"), Some(TypedValue::Double(2.0)));
}

#[test]
fn test_restore_onto_candidates_falls_back_to_short_names() {
    let dest = MemoryScene::new()
        .with("|rig:ctrl|rig:L_arm", "rotateX", TypedValue::Double(0.0))
        .with("|other:L_arm", "rotateX", TypedValue::Double(0.0));
    dest.select(&["|rig:ctrl|rig:L_arm"]);

    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|char:ctrl|char:L_arm", "rotateX", TypedValue::Double(7.0)).unwrap();

    let report = pose
        .restore(&dest, &RestoreOptions::default().use_selection(true))
        .unwrap();
    assert_eq!(report.matches[0].method, Some(MatchMethod::ShortName));
    assert_eq!(dest.value("|rig:ctrl|rig:L_arm", "rotateX"), Some(TypedValue::Double(7.0)));
    assert_eq!(dest.value("|other:L_arm", "rotateX"), Some(TypedValue::Double(0.0)));
}

#[test]
fn test_strict_restore_writes_nothing() {
    let dest = MemoryScene::new()
        .with("|char2:L_arm", "rotateX", TypedValue::Double(0.0))
        .with("|char2:R_arm", "rotateX", TypedValue::Double(0.0));
    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|char:L_arm", "rotateX", TypedValue::Double(1.0)).unwrap();
    pose.insert("|char:spine", "rotateX", TypedValue::Double(2.0)).unwrap();
    pose.insert("|char:R_arm", "rotateX", TypedValue::Double(3.0)).unwrap();

    let options = RestoreOptions::default()
        .namespaces(&["char"], &["char2"])
        .strict(true);
    let before = dest.snapshot().objects;
    let err = pose.restore(&dest, &options).unwrap_err();

    assert!(matches!(err, Error::ObjectNotFound(ref path) if path == "|char:spine"));
    assert!(err.is_not_found());
    assert_eq!(dest.snapshot().objects, before);
}

#[test]
fn test_mirror_swap_exchanges_sides() {
    let scene = MemoryScene::new()
        .with("|L_arm", "translateX", TypedValue::Double(0.0))
        .with("|L_arm", "translateY", TypedValue::Double(0.0))
        .with("|R_arm", "translateX", TypedValue::Double(0.0))
        .with("|R_arm", "translateY", TypedValue::Double(0.0))
        .with("|spine", "rotateY", TypedValue::Double(0.0));

    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|L_arm", "translateX", TypedValue::Double(1.0)).unwrap();
    pose.insert("|L_arm", "translateY", TypedValue::Double(2.0)).unwrap();
    pose.insert("|R_arm", "translateX", TypedValue::Double(-5.0)).unwrap();
    pose.insert("|R_arm", "translateY", TypedValue::Double(6.0)).unwrap();
    pose.insert("|spine", "rotateY", TypedValue::Double(30.0)).unwrap();

    let options = RestoreOptions::default().mirror(biped_table(MirrorMode::Swap), MirrorOption::Both);
    let report = pose.restore(&scene, &options).unwrap();

    assert_eq!(scene.value("|R_arm", "translateX"), Some(TypedValue::Double(-1.0)));
    assert_eq!(scene.value("|R_arm", "translateY"), Some(TypedValue::Double(2.0)));
    assert_eq!(scene.value("|L_arm", "translateX"), Some(TypedValue::Double(5.0)));
    assert_eq!(scene.value("|L_arm", "translateY"), Some(TypedValue::Double(6.0)));
    assert_eq!(scene.value("|spine", "rotateY"), Some(TypedValue::Double(-30.0)));
    assert_eq!(report.resolved(), vec!["|R_arm", "|L_arm", "|spine"]);
}

#[test]
fn test_mirror_on_self_and_exchange() {
    let scene = MemoryScene::new()
        .with("|L_arm", "translateX", TypedValue::Double(0.0))
        .with("|R_arm", "translateX", TypedValue::Double(0.0));
    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|L_arm", "translateX", TypedValue::Double(4.0)).unwrap();

    let on_self = RestoreOptions::default().mirror(biped_table(MirrorMode::MirrorOnSelf), MirrorOption::Both);
    pose.restore(&scene, &on_self).unwrap();
    assert_eq!(scene.value("|L_arm", "translateX"), Some(TypedValue::Double(-4.0)));
    assert_eq!(scene.value("|R_arm", "translateX"), Some(TypedValue::Double(0.0)));

    let exchange = RestoreOptions::default().mirror(biped_table(MirrorMode::Exchange), MirrorOption::Both);
    pose.restore(&scene, &exchange).unwrap();
    assert_eq!(scene.value("|R_arm", "translateX"), Some(TypedValue::Double(4.0)));
}

#[test]
fn test_mirror_table_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("biped.mirror.json");
    std::fs::write(
        &path,
        "// biped\n{\"leftRight\": [[\"L_\", \"R_\"]], \"mirrorAxis\": [\"translateX\"]}\n",
    )
    .unwrap();

    let table = MirrorTable::from_file(&path).expect("Failed to read mirror table");
    assert_eq!(table.mode(), MirrorMode::Swap);

    let copy = dir.path().join("copy.json");
    table.to_file(&copy).unwrap();
    let reread = MirrorTable::from_file(&copy).unwrap();
    assert_eq!(reread.pairs(), table.pairs());
    assert!(reread.is_mirror_axis("translateX"));
}

#[test]
fn test_animation_paste_with_offset() {
    let source = MemoryScene::new().with("|a", "tx", curve(&[(1.0, 0.0), (5.0, 4.0), (10.0, 9.0)]));
    source.set_time_range(FrameRange::new(1.0, 10.0).unwrap());
    let anim = TransferObject::capture(
        TransferKind::Animation,
        &[Node::new(&source, "|a")],
        &AttributeFilter::All,
        None,
    )
    .unwrap();

    let dest = MemoryScene::new().with("|a", "tx", curve(&[(0.0, 1.0), (100.0, 1.0), (103.0, 1.0), (200.0, 1.0)]));
    let options = RestoreOptions::default().animation(AnimationOptions {
        source_range: Some(FrameRange::new(5.0, 10.0).unwrap()),
        start_frame: Some(100.0),
        paste: PasteOption::Replace,
    });
    let report = anim.restore(&dest, &options).unwrap();

    assert_eq!(report.time_range, Some(FrameRange::new(100.0, 105.0).unwrap()));
    assert_eq!(
        keys_of(&dest, "|a", "tx"),
        vec![(0.0, 1.0), (100.0, 4.0), (105.0, 9.0), (200.0, 1.0)]
    );
}

#[test]
fn test_animation_insert_and_replace_all() {
    let mut anim = TransferObject::new(TransferKind::Animation);
    anim.metadata_mut().set_captured_range(FrameRange::new(0.0, 2.0).unwrap());
    anim.insert("|a", "tx", curve(&[(0.0, 5.0), (2.0, 5.0)])).unwrap();

    let dest = MemoryScene::new().with("|a", "tx", curve(&[(0.0, 1.0), (10.0, 1.0)]));
    let insert = RestoreOptions::default().animation(AnimationOptions {
        start_frame: Some(5.0),
        paste: PasteOption::Insert,
        ..Default::default()
    });
    anim.restore(&dest, &insert).unwrap();
    assert_eq!(
        keys_of(&dest, "|a", "tx"),
        vec![(0.0, 1.0), (5.0, 5.0), (7.0, 5.0), (13.0, 1.0)]
    );

    let replace_all = RestoreOptions::default().animation(AnimationOptions {
        paste: PasteOption::ReplaceAll,
        ..Default::default()
    });
    anim.restore(&dest, &replace_all).unwrap();
    assert_eq!(keys_of(&dest, "|a", "tx"), vec![(0.0, 5.0), (2.0, 5.0)]);
}

#[test]
fn test_animation_out_of_range_fails() {
    let mut anim = TransferObject::new(TransferKind::Animation);
    anim.metadata_mut().set_captured_range(FrameRange::new(20.0, 30.0).unwrap());
    anim.insert("|a", "tx", curve(&[(20.0, 0.0), (30.0, 1.0)])).unwrap();
    let dest = MemoryScene::new().with("|a", "tx", TypedValue::Double(3.0));

    for (start, end) in [(5.0, 15.0), (65.0, 95.0)] {
        let options = RestoreOptions::default().animation(AnimationOptions {
            source_range: Some(FrameRange::new(start, end).unwrap()),
            ..Default::default()
        });
        assert!(matches!(anim.restore(&dest, &options), Err(Error::OutOfBounds { .. })));
    }
    assert_eq!(dest.value("|a", "tx"), Some(TypedValue::Double(3.0)));
}

#[test]
fn test_type_mismatch_leaves_attribute_untouched() {
    let dest = MemoryScene::new()
        .with("|a", "mode", TypedValue::Enum(1))
        .with("|a", "tx", TypedValue::Double(0.0));
    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|a", "mode", TypedValue::Bool(true)).unwrap();
    pose.insert("|a", "tx", TypedValue::Double(2.0)).unwrap();

    let report = pose.restore(&dest, &RestoreOptions::default()).unwrap();
    assert_eq!(dest.value("|a", "mode"), Some(TypedValue::Enum(1)));
    assert_eq!(dest.value("|a", "tx"), Some(TypedValue::Double(2.0)));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].attribute, "|a.mode");
}

#[test]
fn test_selection_set_resolves_members_only() {
    let dest = MemoryScene::new()
        .with("|char2:L_arm", "rotateX", TypedValue::Double(0.0))
        .with("|char2:R_arm", "rotateX", TypedValue::Double(0.0));
    let mut set = TransferObject::new(TransferKind::SelectionSet);
    set.add_object("|char:R_arm");
    set.add_object("|char:L_arm");
    set.add_object("|char:gone");

    let options = RestoreOptions::default().namespaces(&["char"], &["char2"]);
    let report = set.restore(&dest, &options).unwrap();

    assert_eq!(report.resolved(), vec!["|char2:R_arm", "|char2:L_arm"]);
    assert!(report.written.is_empty());
    assert_eq!(report.skipped, vec!["|char:gone"]);
}

#[test]
fn test_scene_snapshot_round_trip_and_restore() {
    let dir = tempdir().expect("Failed to create temp dir");
    let scene_path = dir.path().join("shot.scene.json");
    std::fs::write(
        &scene_path,
        r#"{
            "objects": {
                "|char2:L_arm": {"rotateX": {"type": "double", "value": 0.0}}
            },
            "selection": ["|char2:L_arm"],
            "timeRange": [1, 48]
        }"#,
    )
    .unwrap();

    let scene = MemoryScene::load(&scene_path).expect("Failed to load scene");
    assert_eq!(scene.current_time_range(), FrameRange::new(1.0, 48.0).unwrap());

    let mut pose = TransferObject::new(TransferKind::Pose);
    pose.insert("|char:L_arm", "rotateX", TypedValue::Double(12.5)).unwrap();
    pose.restore(&scene, &RestoreOptions::default().use_selection(true)).unwrap();
    scene.save(&scene_path).unwrap();

    let reloaded = MemoryScene::load(&scene_path).unwrap();
    assert_eq!(reloaded.value("|char2:L_arm", "rotateX"), Some(TypedValue::Double(12.5)));
    assert_eq!(reloaded.list_selected(), vec!["|char2:L_arm".to_string()]);
}

#[test]
fn test_match_names_partitions_sources() {
    let src = ["|char:L_arm", "|char:R_arm", "|char:tail"];
    let dst = ["|char2:L_arm", "|char2:R_arm"];
    let matches = match_names(&src, &dst, &["char".to_string()], &["char2".to_string()]);

    let resolved: Vec<_> = matches.pairs().map(|(s, _)| s).collect();
    let unresolved: Vec<_> = matches.unresolved().collect();
    assert_eq!(resolved.len() + unresolved.len(), src.len());
    assert_eq!(unresolved, vec!["|char:tail"]);
}

#[test]
fn test_strip_after_apply_namespace() {
    for path in ["|a|b|c", "|ns:a|ns:b", "|x:y:leaf"] {
        assert_eq!(
            strip_namespaces(&with_namespace(path, "char2")),
            strip_namespaces(path)
        );
    }
}
