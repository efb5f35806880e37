use crate::{Float, Point2f, Point2i, Point3f, Ray, Transform, Transformable, Vec3f};
use cgmath::InnerSpace;

#[derive(Clone, Copy, Debug)]
pub struct CameraSample {
    /// Continuous raster position, `(0, 0)` at the top left corner of the film.
    pub p_film: Point2f,
}

pub trait Camera: Send + Sync {
    /// Returns the importance weight of the ray along with the world space ray.
    fn generate_ray(&self, sample: CameraSample) -> (Float, Ray);

    fn resolution(&self) -> Point2i;
}

/// Which image axis the field of view angle is measured along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FovAxis {
    X,
    Y,
    Smaller,
    Larger,
    Diagonal,
}

impl std::str::FromStr for FovAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(FovAxis::X),
            "y" => Ok(FovAxis::Y),
            "smaller" => Ok(FovAxis::Smaller),
            "larger" => Ok(FovAxis::Larger),
            "diagonal" => Ok(FovAxis::Diagonal),
            other => Err(format!("unknown fov_axis '{}'", other)),
        }
    }
}

/// Pinhole camera looking down its local +z axis, with +x pointing left and +y up.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    camera_to_world: Transform,
    resolution: Point2i,
    tan_half_fov: (Float, Float),
    near_clip: Float,
    far_clip: Float,
}

impl PerspectiveCamera {
    pub fn new(
        camera_to_world: Transform,
        resolution: Point2i,
        fov: Float,
        fov_axis: FovAxis,
        near_clip: Float,
        far_clip: Float,
    ) -> Self {
        let (w, h) = (resolution.x as Float, resolution.y as Float);
        let aspect = w / h;
        let tan_fov = (fov.to_radians() * 0.5).tan();

        let axis = match fov_axis {
            FovAxis::Smaller => if aspect > 1.0 { FovAxis::Y } else { FovAxis::X },
            FovAxis::Larger => if aspect > 1.0 { FovAxis::X } else { FovAxis::Y },
            a => a,
        };

        let tan_half_fov = match axis {
            FovAxis::X => (tan_fov, tan_fov / aspect),
            FovAxis::Y => (tan_fov * aspect, tan_fov),
            _ => {
                let diagonal = (w * w + h * h).sqrt();
                (tan_fov * w / diagonal, tan_fov * h / diagonal)
            }
        };

        Self { camera_to_world, resolution, tan_half_fov, near_clip, far_clip }
    }

    /// Unnormalized camera space direction through a raster position.
    fn raster_to_camera(&self, p_film: Point2f) -> Vec3f {
        let ndc_x = p_film.x / self.resolution.x as Float * 2.0 - 1.0;
        let ndc_y = p_film.y / self.resolution.y as Float * 2.0 - 1.0;
        Vec3f::new(-ndc_x * self.tan_half_fov.0, -ndc_y * self.tan_half_fov.1, 1.0)
    }
}

impl Camera for PerspectiveCamera {
    fn generate_ray(&self, sample: CameraSample) -> (Float, Ray) {
        let d = self.raster_to_camera(sample.p_film);
        let dir = d.normalize();
        let inv_z = 1.0 / dir.z;
        let near_t = self.near_clip * inv_z;
        let far_t = self.far_clip * inv_z;

        let ray = Ray {
            origin: Point3f::new(0.0, 0.0, 0.0) + dir * near_t,
            dir,
            t_max: far_t - near_t,
        };
        (1.0, ray.transform(self.camera_to_world))
    }

    fn resolution(&self) -> Point2i {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::assert_abs_diff_eq;

    fn camera(fov_axis: FovAxis) -> PerspectiveCamera {
        let to_world = Transform::look_at(
            point3f!(0, 0, 5),
            point3f!(0, 0, 0),
            vec3f!(0, 1, 0),
        ).unwrap();
        PerspectiveCamera::new(to_world, Point2i::new(200, 100), 90.0, fov_axis, 0.01, 1000.0)
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = camera(FovAxis::X);
        let (w, ray) = cam.generate_ray(CameraSample { p_film: Point2f::new(100.0, 50.0) });
        assert_eq!(w, 1.0);
        assert_abs_diff_eq!(ray.dir, vec3f!(0, 0, -1), epsilon = 1e-5);
    }

    #[test]
    fn test_image_right_maps_to_world_right() {
        // looking down -z with +y up, the right edge of the image is +x in world space
        let cam = camera(FovAxis::X);
        let (_, ray) = cam.generate_ray(CameraSample { p_film: Point2f::new(200.0, 50.0) });
        assert!(ray.dir.x > 0.0);
        // 90 degree horizontal fov puts the edge at 45 degrees
        assert_abs_diff_eq!(ray.dir.x, -ray.dir.z, epsilon = 1e-5);

        let (_, ray) = cam.generate_ray(CameraSample { p_film: Point2f::new(100.0, 0.0) });
        assert!(ray.dir.y > 0.0);
    }

    #[test]
    fn test_fov_axis_smaller_uses_height_for_wide_images() {
        let cam = camera(FovAxis::Smaller);
        let (_, ray) = cam.generate_ray(CameraSample { p_film: Point2f::new(100.0, 0.0) });
        assert_abs_diff_eq!(ray.dir.y, -ray.dir.z, epsilon = 1e-5);
    }
}
