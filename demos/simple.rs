use std::time::Duration;

use quad_attitude::{Connectivity, Session};

const FRAME_PERIOD: Duration = Duration::from_micros(16_667); // 60 Hz render tick

fn main() {
    let mut session = Session::new();
    session.set_connectivity(Connectivity::Connected);

    for i in 0..10 {
        // this should be each text message received from the sensor link
        let t = i as f64 * 0.1;
        let text = format!(
            r#"{{"r":{:.2},"p":{:.2},"y":{:.2}}}"#,
            t.sin() * 30.0,
            (t * 0.5).sin() * 20.0,
            (t * 10.0) % 360.0
        );
        session.handle_packet(&text);

        let frame = session.tick(FRAME_PERIOD);
        println!("{}  {}", frame.orientation.euler, frame.command);
    }

    session.reset_yaw();
    let frame = session.tick(FRAME_PERIOD);
    println!("after yaw reset: {}", frame.orientation.euler);

    session.set_connectivity(Connectivity::Disconnected);
    let frame = session.tick(FRAME_PERIOD);
    println!("link lost: {}", frame.command);
}
