//! Build an acceleration tree over a synthetic scene and fire random
//! rays at it. Every result can be checked against a brute force scan
//! over all primitives.

// std
use std::sync::Arc;
use std::time::Instant;
// others
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
// rs_accel
use rs_accel::accelerators::kdtreeaccel::KdTreeAccel;
use rs_accel::accelerators::octree::{Octree64Accel, OctreeAccel, SahOctreeAccel};
use rs_accel::accelerators::tree::{AccelTree, TreeFlavor};
use rs_accel::blockqueue::BlockQueue;
use rs_accel::core::error::NodeError;
use rs_accel::core::geometry::{Bounds3f, Point3f, Ray, Vector3f};
use rs_accel::core::interaction::Hit;
use rs_accel::core::paramset::ParamSet;
use rs_accel::core::pbrt::Float;
use rs_accel::core::primitive::Primitive;
use rs_accel::core::rng::Rng;
use rs_accel::shapes::cuboid::cube_grid;
use rs_accel::shapes::sphere::Sphere;
use rs_accel::shapes::triangle::{create_triangle_mesh, TriangleMesh};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

type BoxedPrimitive = Box<dyn Primitive + Send + Sync>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Accel {
    Kdtree,
    Octree,
    Octree64,
    Sahoctree,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Shape {
    Cubes,
    Spheres,
    Triangles,
}

/// Build an acceleration tree over a grid of shapes and trace random
/// rays through it.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// accelerator to build
    #[arg(short = 'a', long, value_enum, default_value_t = Accel::Kdtree)]
    accel: Accel,
    /// shape placed at every grid point
    #[arg(short = 's', long, value_enum, default_value_t = Shape::Cubes)]
    shape: Shape,
    /// grid points per axis (spacing 2)
    #[arg(short = 'g', long, default_value_t = 10)]
    grid: usize,
    /// number of random rays
    #[arg(short = 'r', long, default_value_t = 100_000)]
    rays: usize,
    /// kd-tree split method ("sah" or "middle")
    #[arg(long, default_value = "sah")]
    splitmethod: String,
    /// maximum number of primitives per leaf
    #[arg(long, default_value_t = 1)]
    maxprims: i32,
    /// maximum tree depth, <= 0 derives it from the scene size
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    maxdepth: i32,
    #[arg(long, default_value_t = 80.0)]
    intersectcost: Float,
    #[arg(long, default_value_t = 1.0)]
    traversalcost: Float,
    /// use specified number of threads (0 = all cores)
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: u8,
    /// don't compare results with a brute force scan
    #[arg(long)]
    skip_check: bool,
}

fn create_scene(shape: Shape, n: usize) -> Vec<BoxedPrimitive> {
    let cubes = cube_grid(n, 2.0 as Float);
    let mut prims: Vec<BoxedPrimitive> = Vec::new();
    for cube in cubes {
        match shape {
            Shape::Cubes => prims.push(Box::new(cube)),
            Shape::Spheres => prims.push(Box::new(Sphere::new(cube.bounds.center(), 0.5))),
            Shape::Triangles => {
                let mesh: Arc<TriangleMesh> = Arc::new(TriangleMesh::from_bounds(&cube.bounds));
                for tri in create_triangle_mesh(mesh) {
                    prims.push(Box::new(tri));
                }
            }
        }
    }
    prims
}

/// Rays starting outside the scene, aimed at random points inside.
fn create_rays(bounds: &Bounds3f, n: usize) -> Vec<Ray> {
    let mut rng: Rng = Rng::with_sequence(n as u64);
    let center: Point3f = bounds.center();
    let radius: Float = bounds.diagonal().length().max(1.0);
    let mut rays: Vec<Ray> = Vec::with_capacity(n);
    for _ in 0..n {
        let dir: Vector3f = Vector3f::new(
            rng.uniform_float_range(-1.0, 1.0),
            rng.uniform_float_range(-1.0, 1.0),
            rng.uniform_float_range(-1.0, 1.0),
        );
        if dir.length_squared() < 1e-4 {
            continue;
        }
        let o: Point3f = center + dir.normalize() * radius;
        let target: Point3f = Point3f::new(
            rng.uniform_float_range(bounds.p_min.x, bounds.p_max.x),
            rng.uniform_float_range(bounds.p_min.y, bounds.p_max.y),
            rng.uniform_float_range(bounds.p_min.z, bounds.p_max.z),
        );
        rays.push(Ray::new(o, (target - o).normalize()));
    }
    rays
}

fn brute_force(prims: &[BoxedPrimitive], ray: &Ray) -> Option<Hit> {
    prims
        .iter()
        .filter_map(|p| p.intersect(ray))
        .fold(None, |best: Option<Hit>, hit| match best {
            Some(b) => Some(b.closest(hit)),
            None => Some(hit),
        })
}

#[derive(Debug, Default, Copy, Clone)]
struct BatchResult {
    n_rays: usize,
    n_hits: usize,
    n_occluded: usize,
    n_mismatches: usize,
}

fn trace<F: TreeFlavor>(
    tree: &AccelTree<F, BoxedPrimitive>,
    prims: &[BoxedPrimitive],
    rays: &[Ray],
    num_cores: usize,
    check: bool,
) -> BatchResult {
    let block_queue: BlockQueue = BlockQueue::new(rays.len(), 1024);
    let bq = &block_queue;
    let mut total: BatchResult = BatchResult::default();
    let result = crossbeam::scope(|scope| {
        let (result_tx, result_rx) = crossbeam_channel::bounded(num_cores);
        // spawn worker threads
        for _ in 0..num_cores {
            let result_tx = result_tx.clone();
            scope.spawn(move |_| {
                while let Some(batch) = bq.next() {
                    let mut result: BatchResult = BatchResult::default();
                    for ray in &rays[batch] {
                        result.n_rays += 1;
                        let hit: Option<Hit> = tree.intersect(ray);
                        if hit.is_some() {
                            result.n_hits += 1;
                        }
                        if tree.intersect_p(ray) {
                            result.n_occluded += 1;
                        }
                        if check {
                            let expected: Option<Hit> = brute_force(prims, ray);
                            let same: bool = match (hit, expected) {
                                (None, None) => true,
                                (Some(h), Some(e)) => {
                                    (h.t_hit - e.t_hit).abs() <= 1e-4 * e.t_hit.max(1.0)
                                }
                                _ => false,
                            };
                            if !same {
                                warn!("{:?}: tree {:?}, brute force {:?}", ray, hit, expected);
                                result.n_mismatches += 1;
                            }
                        }
                    }
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);
        // collect results on this thread
        for _ in pbr::PbIter::new(0..bq.len()) {
            match result_rx.recv() {
                Ok(result) => {
                    total.n_rays += result.n_rays;
                    total.n_hits += result.n_hits;
                    total.n_occluded += result.n_occluded;
                    total.n_mismatches += result.n_mismatches;
                }
                Err(_) => break,
            }
        }
    });
    if result.is_err() {
        error!("a worker thread panicked");
        total.n_mismatches += 1;
    }
    total
}

fn run<F: TreeFlavor>(
    tree: Result<AccelTree<F, BoxedPrimitive>, NodeError>,
    build_start: Instant,
    prims: &[BoxedPrimitive],
    args: &Cli,
    num_cores: usize,
) -> bool {
    let tree = match tree {
        Ok(tree) => tree,
        Err(e) => {
            error!("building the tree failed: {}", e);
            return false;
        }
    };
    let build_time = build_start.elapsed();
    println!("{} built in {:?}", tree.flavor.name(), build_time);
    println!("  {}", tree.stats());
    let rays: Vec<Ray> = create_rays(&tree.world_bound(), args.rays);
    println!("Tracing {} rays with {} thread(s) ...", rays.len(), num_cores);
    let start = Instant::now();
    let total: BatchResult = trace(&tree, prims, &rays, num_cores, !args.skip_check);
    let elapsed = start.elapsed();
    let secs: f64 = elapsed.as_secs_f64().max(1e-9);
    println!(
        "{} rays, {} hits, {} occluded in {:?} ({:.0} rays/s)",
        total.n_rays,
        total.n_hits,
        total.n_occluded,
        elapsed,
        total.n_rays as f64 / secs
    );
    if args.skip_check {
        true
    } else if total.n_mismatches == 0 {
        println!("All results match a brute force scan.");
        true
    } else {
        error!("{} result(s) differ from a brute force scan", total.n_mismatches);
        false
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    // handle command line options
    let args = Cli::parse();
    let num_cores: usize = if args.nthreads == 0_u8 {
        num_cpus::get()
    } else {
        args.nthreads as usize
    };
    println!(
        "rs_accel version {} [Detected {} cores]",
        VERSION,
        num_cpus::get()
    );
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_cores)
        .build_global()
    {
        warn!("could not configure the thread pool: {}", e);
    }
    let prims: Vec<BoxedPrimitive> = create_scene(args.shape, args.grid);
    info!("{} primitives ({:?})", prims.len(), args.shape);
    let mut ps: ParamSet = ParamSet::default();
    ps.add_string(String::from("splitmethod"), args.splitmethod.clone());
    ps.add_int(String::from("maxprims"), args.maxprims);
    ps.add_int(String::from("maxdepth"), args.maxdepth);
    ps.add_float(String::from("intersectcost"), args.intersectcost);
    ps.add_float(String::from("traversalcost"), args.traversalcost);
    let start = Instant::now();
    let ok: bool = match args.accel {
        Accel::Kdtree => run(KdTreeAccel::create(&prims, &ps), start, &prims, &args, num_cores),
        Accel::Octree => run(OctreeAccel::create(&prims, &ps), start, &prims, &args, num_cores),
        Accel::Octree64 => run(Octree64Accel::create(&prims, &ps), start, &prims, &args, num_cores),
        Accel::Sahoctree => {
            run(SahOctreeAccel::create(&prims, &ps), start, &prims, &args, num_cores)
        }
    };
    ps.report_unused();
    if !ok {
        std::process::exit(1);
    }
}
