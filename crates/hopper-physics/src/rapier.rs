//! rapier3d backend

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::prelude::*;
use tracing::debug;

use crate::{BodyHandle, CharacterBodyDesc, PhysicsBackend, PhysicsConfig, PhysicsError};

/// Per-body data the pipeline does not keep for us
#[derive(Debug, Clone, Copy)]
struct CharacterProbe {
    /// Ray length from the capsule centre
    length: f32,
}

/// Physics world backed by the rapier3d pipeline
pub struct RapierPhysics {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    rigid_body_set: RigidBodySet,
    /// Collider storage
    collider_set: ColliderSet,
    /// Impulse joint storage
    impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    multibody_joint_set: MultibodyJointSet,

    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Physics pipeline
    physics_pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,
    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,
    /// Continuous collision detection solver
    ccd_solver: CCDSolver,
    /// Query pipeline for ground probes
    query_pipeline: QueryPipeline,

    /// Ground probe settings per character body
    probes: std::collections::HashMap<RigidBodyHandle, CharacterProbe>,
}

impl RapierPhysics {
    /// Create a new physics world with default configuration
    pub fn new() -> Result<Self, PhysicsError> {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;

        Ok(Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            probes: std::collections::HashMap::new(),
        })
    }

    fn rapier_handle(body: BodyHandle) -> RigidBodyHandle {
        let (index, generation) = body.into_raw_parts();
        RigidBodyHandle::from_raw_parts(index, generation)
    }

    fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        let handle = self.collider_set.insert(collider);
        // Keep probes valid before the first step
        self.query_pipeline.update(&self.collider_set);
        handle
    }
}

impl PhysicsBackend for RapierPhysics {
    fn name(&self) -> &'static str {
        "rapier"
    }

    fn create_character_body(
        &mut self,
        desc: &CharacterBodyDesc,
    ) -> Result<BodyHandle, PhysicsError> {
        desc.validate()?;

        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![desc.position.x, desc.position.y, desc.position.z])
            .lock_rotations()
            .can_sleep(false)
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::capsule_y(desc.half_height.max(0.01), desc.radius)
            .mass(desc.mass)
            .friction(0.0) // Velocity is set directly, walls should not grab
            .restitution(0.0)
            .build();

        let rb_handle = self.rigid_body_set.insert(rigid_body);
        self.collider_set
            .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        self.query_pipeline.update(&self.collider_set);
        self.probes.insert(
            rb_handle,
            CharacterProbe {
                length: desc.probe_length(),
            },
        );

        let (index, generation) = rb_handle.into_raw_parts();
        debug!("Spawned rapier character body at {}", desc.position);
        Ok(BodyHandle::from_raw_parts(index, generation))
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let handle = Self::rapier_handle(body);
        self.probes.remove(&handle);
        let removed = self
            .rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some();
        if removed {
            self.query_pipeline.update(&self.collider_set);
        }
        removed
    }

    fn add_ground(&mut self, y: f32) {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground);
    }

    fn add_static_box(&mut self, half_extents: Vec3, position: Vec3) {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .build();
        self.add_static_collider(collider);
    }

    fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.integration_parameters.dt = dt;
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // Update query pipeline after physics step
        self.query_pipeline.update(&self.collider_set);
    }

    fn is_grounded(&self, body: BodyHandle) -> Option<bool> {
        let handle = Self::rapier_handle(body);
        let rigid_body = self.rigid_body_set.get(handle)?;
        let probe = self.probes.get(&handle)?;

        let origin = rigid_body.translation();
        let ray = Ray::new(point![origin.x, origin.y, origin.z], vector![0.0, -1.0, 0.0]);
        let filter = QueryFilter::default().exclude_rigid_body(handle);

        let hit = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            probe.length,
            true,
            filter,
        );
        Some(hit.is_some())
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let v = self.rigid_body_set.get(Self::rapier_handle(body))?.linvel();
        Some(Vec3::new(v.x, v.y, v.z))
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> bool {
        match self.rigid_body_set.get_mut(Self::rapier_handle(body)) {
            Some(rigid_body) => {
                rigid_body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
                true
            }
            None => false,
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> bool {
        match self.rigid_body_set.get_mut(Self::rapier_handle(body)) {
            Some(rigid_body) => {
                rigid_body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
                true
            }
            None => false,
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        let t = self.rigid_body_set.get(Self::rapier_handle(body))?.translation();
        Some(Vec3::new(t.x, t.y, t.z))
    }
}
