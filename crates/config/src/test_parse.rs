#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use netmotion_engine::{Direction, MovementPolicy, VariationKind, Vector2};

    use crate::*;

    #[test]
    fn empty_tuple_gives_defaults() {
        let s = from_ron_str("()").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.address, "localhost");
        assert_eq!(s.port, 12345);
        assert_eq!(s.update_rate_hz, 60);
        assert_eq!(s.keep_alive_timeout_secs, 8);
        assert_eq!(s.profiles().len(), 1);
    }

    #[test]
    fn full_file_parses() {
        let ron = r#"(
            address: "127.0.0.1",
            port: 4000,
            source: "Camera",
            update_rate_hz: 30,
            keep_alive_timeout_secs: 5,
            element: (
                position: (x: 10.0, y: 20.0),
                scale: (x: 1.0, y: 1.0),
                base: (x: 640.0, y: 480.0),
            ),
            animations: [
                (variation: Position, movement: Duration, duration: 3,
                 destination: (x: 500.0, y: 300.0), command: "Move"),
                (variation: PositionFreeAll, movement: Speed, speed: 120.0,
                 command: "All", stop_command: "Stop"),
                (variation: PositionFree, direction: UpLeft, speed: 40.0,
                 command: "Drift", stop_command: "Halt"),
            ],
        )"#;
        let s = from_ron_str(ron).unwrap();
        assert_eq!(s.port, 4000);
        assert_eq!(s.source, "Camera");
        assert_eq!(s.element.base, Vector2::new(640.0, 480.0));

        let p = s.profiles();
        assert_eq!(p.len(), 3);
        assert_eq!(p[0].destination, Vector2::new(500.0, 300.0));
        assert_eq!(p[0].movement, MovementPolicy::Duration);
        assert_eq!(p[1].variation, VariationKind::PositionFreeAll);
        assert_eq!(p[1].stop_command, "Stop");
        assert_eq!(p[2].direction, Direction::UpLeft);
    }

    #[test]
    fn omitted_profile_fields_take_defaults() {
        let s = from_ron_str(r#"(animations: [(command: "Go")])"#).unwrap();
        let p = &s.animations[0];
        assert_eq!(p.variation, VariationKind::Position);
        assert_eq!(p.movement, MovementPolicy::Duration);
        assert_eq!(p.duration, 3);
        assert_eq!(p.speed, 10.0);
        assert_eq!(p.direction, Direction::Right);
    }

    #[test]
    fn too_many_animations_fails() {
        let items = vec!["()"; 26].join(", ");
        let res = from_ron_str(&format!("(animations: [{}])", items));
        assert!(matches!(res, Err(Error::Validation { .. })), "{res:?}");

        let items = vec!["()"; 25].join(", ");
        assert!(from_ron_str(&format!("(animations: [{}])", items)).is_ok());
    }

    #[test]
    fn empty_animation_list_fails() {
        let res = from_ron_str("(animations: [])");
        assert!(matches!(res, Err(Error::Validation { .. })));
    }

    #[test]
    fn zero_speed_fails() {
        let res = from_ron_str("(animations: [(speed: 0.0)])");
        match res {
            Err(e @ Error::Validation { .. }) => assert!(e.to_string().contains("speed")),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn short_keep_alive_fails() {
        let res = from_ron_str("(keep_alive_timeout_secs: 1)");
        assert!(matches!(res, Err(Error::Validation { .. })));
        assert!(from_ron_str("(keep_alive_timeout_secs: 2)").is_ok());
    }

    #[test]
    fn update_rate_out_of_range_fails() {
        assert!(from_ron_str("(update_rate_hz: 0)").is_err());
        assert!(from_ron_str("(update_rate_hz: 1001)").is_err());
        assert!(from_ron_str("(update_rate_hz: 1000)").is_ok());
    }

    #[test]
    fn unknown_field_fails() {
        // misspelled stop_command => stop_comand should error
        let res = from_ron_str(r#"(animations: [(stop_comand: "x")])"#);
        assert!(matches!(res, Err(Error::Parse { .. })));
    }

    #[test]
    fn syntax_error_reports_location() {
        let ron = "(\n    port: 12345,\n    address: ,\n)";
        match from_ron_str(ron) {
            Err(Error::Parse {
                line, excerpt, ..
            }) => {
                assert_eq!(line, 3);
                assert!(excerpt.contains("address"));
                assert!(excerpt.contains('^'));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn load_from_path_attaches_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netmotion.ron");
        fs::write(&path, "(port: 9000)").unwrap();
        assert_eq!(load_from_path(&path).unwrap().port, 9000);

        fs::write(&path, "(port: 0, update_rate_hz: 0)").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.pretty().contains("netmotion.ron"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_from_path(Path::new("/nonexistent/netmotion.ron")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn explicit_path_wins() {
        let p = Path::new("/etc/custom.ron");
        assert_eq!(resolve_config_path(Some(p)).unwrap(), p.to_path_buf());
    }
}
