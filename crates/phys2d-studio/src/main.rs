use phys2d_engine::coords::Point2D;
use phys2d_engine::logging::{init_logging, LoggingConfig};
use phys2d_engine::{RenderEngine, Shape, ShapeKind};

const WIDTH: i32 = 500;
const HEIGHT: i32 = 500;
const TITLE: &str = "Phys2D";

fn main() {
    init_logging(LoggingConfig::default());

    let mut engine = match RenderEngine::new(WIDTH, HEIGHT, TITLE) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("cannot construct render engine: {}", e.report());
            return;
        }
    };

    // Placeholders only; the loop does not draw them yet.
    let center = Point2D::new(WIDTH / 2, HEIGHT / 2);
    engine.add_object(Shape::new(ShapeKind::Circle).at(center));
    engine.add_object(Shape::new(ShapeKind::Rectangle).at(center.translate(-100, 80)));
    engine.add_object(Shape::new(ShapeKind::Triangle).at(center.translate(100, 80)));

    // Failures are logged inside `run`; the process exits normally either way.
    if let Some((phase, _)) = engine.run().failure() {
        log::warn!("phys2d stopped early during {phase}");
    }
}
