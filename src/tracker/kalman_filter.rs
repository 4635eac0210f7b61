//! Constant-velocity Kalman filter over box center and size.
//!
//! State is `[cx, cy, w, h, vcx, vcy, vw, vh]`, the measurement is
//! `[cx, cy, w, h]`. Matrices are held in ndarray; the 4x4 innovation inverse
//! goes through nalgebra.

use ndarray::{Array1, Array2};

use crate::error::{Result, SignalError};

const NDIM: usize = 4;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_noise: Array2<f64>,
    measurement_noise: Array2<f64>,
    initial_variance: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let dt = 1.0;
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = dt;
        }

        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            process_noise: Array2::eye(2 * NDIM) * 0.01,
            measurement_noise: Array2::eye(NDIM),
            initial_variance: 10.0,
        }
    }

    /// Start a track at `measurement` with zero velocity and a wide covariance.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(2 * NDIM);
        for i in 0..NDIM {
            mean[i] = measurement[i];
        }
        let cov = Array2::eye(2 * NDIM) * self.initial_variance;
        (mean, cov)
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_noise;
        (new_mean, new_covariance)
    }

    /// Project the state into measurement space: `(H x, H P H^T + R)`.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_noise;
        (mean_proj, covariance_proj)
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let innovation = Array1::from_vec(measurement.to_vec()) - projected_mean;

        // K = P H^T S^-1
        let s_inv = invert_4x4(&projected_cov)?;
        let pht = covariance.dot(&self.update_mat.t());
        let kalman_gain = pht.dot(&s_inv);

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let identity: Array2<f64> = Array2::eye(2 * NDIM);
        let new_covariance = (identity - kalman_gain.dot(&self.update_mat)).dot(covariance);

        Ok((new_mean, new_covariance))
    }
}

fn invert_4x4(m: &Array2<f64>) -> Result<Array2<f64>> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..NDIM {
        for j in 0..NDIM {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse().ok_or(SignalError::SingularInnovation)?;
    let mut res = Array2::zeros((NDIM, NDIM));
    for i in 0..NDIM {
        for j in 0..NDIM {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 200.0, 40.0, 50.0]);
        assert_eq!(mean[0], 100.0);
        assert_eq!(mean[3], 50.0);
        assert_eq!(mean[4], 0.0);
        assert_eq!(cov[[0, 0]], 10.0);
        assert_eq!(cov[[0, 1]], 0.0);
    }

    #[test]
    fn test_predict_applies_velocity() {
        let kf = KalmanFilter::new();
        let (mut mean, cov) = kf.initiate([100.0, 200.0, 40.0, 50.0]);
        mean[4] = 3.0;
        mean[5] = -2.0;
        let (predicted, predicted_cov) = kf.predict(&mean, &cov);
        assert_eq!(predicted[0], 103.0);
        assert_eq!(predicted[1], 198.0);
        assert!(predicted_cov[[0, 0]] > cov[[0, 0]]);
    }

    #[test]
    fn test_update_pulls_towards_measurement() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 100.0, 40.0, 40.0]);
        let (mean, cov) = kf.predict(&mean, &cov);
        let (updated, updated_cov) = kf.update(&mean, &cov, [110.0, 100.0, 40.0, 40.0]).unwrap();
        assert!(updated[0] > 100.0 && updated[0] < 110.0);
        assert!(updated[4] > 0.0);
        assert!(updated_cov[[0, 0]] < cov[[0, 0]]);
    }

    #[test]
    fn test_singular_innovation_is_an_error() {
        let m = Array2::<f64>::zeros((4, 4));
        assert!(matches!(invert_4x4(&m), Err(SignalError::SingularInnovation)));
    }
}
