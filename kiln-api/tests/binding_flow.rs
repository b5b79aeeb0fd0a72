//! Drives a frame's worth of binding work through the null device: root signature,
//! resource set, PSO, framebuffer, and recording context, observing the batching
//! counters the null backend keeps.

use kiln_api::{
    KilnBufferDef, KilnClearValues, KilnColorClearValue, KilnDescriptorRangeType,
    KilnDeviceContext, KilnExtents3D, KilnFormat, KilnFrameBuffer, KilnGraphicsPso,
    KilnResourceSet, KilnResourceState, KilnResourceType, KilnRootSignatureDef,
    KilnRootSignatureFlags, KilnShaderModuleDef, KilnShaderStageDef, KilnShaderStageFlags,
    KilnShaderVisibility, KilnTextureDef,
};

#[test]
fn frame_binding_flow_batches_descriptor_updates() {
    let device_context = KilnDeviceContext::new_null();

    let mut signature_def = KilnRootSignatureDef::new(2, 0);
    signature_def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);
    signature_def.init_as_descriptor_range(
        1,
        KilnDescriptorRangeType::TextureSrv,
        0,
        2,
        KilnShaderVisibility::Pixel,
    );
    signature_def.set_parameter_name(0, "per_view");
    let root_signature = device_context
        .create_root_signature(&signature_def, "frame", KilnRootSignatureFlags::NONE)
        .unwrap();
    assert_eq!(root_signature.find_parameter_by_name("per_view"), Some(0));

    let uniforms = device_context
        .create_buffer(&KilnBufferDef::for_uniform_buffer_size(256))
        .unwrap();
    let albedo = device_context
        .create_texture(&KilnTextureDef {
            extents: KilnExtents3D {
                width: 256,
                height: 256,
                depth: 1,
            },
            format: KilnFormat::R8G8B8A8Unorm,
            ..Default::default()
        })
        .unwrap();

    let vertex_module = device_context
        .create_shader_module(KilnShaderModuleDef::SpvBytes(b"vertex shader"))
        .unwrap();
    let vertex_shader = device_context
        .create_shader(&KilnShaderStageDef {
            shader_module: vertex_module,
            entry_point: "main".to_string(),
            stage: KilnShaderStageFlags::VERTEX,
        })
        .unwrap();

    let mut pso = KilnGraphicsPso::new();
    pso.set_root_signature(&root_signature);
    pso.set_vertex_shader(&vertex_shader);
    pso.set_render_target_format(KilnFormat::R8G8B8A8Unorm, None);
    pso.finalize(&device_context, "opaque").unwrap();

    let backbuffer = device_context
        .create_texture(&KilnTextureDef {
            extents: KilnExtents3D {
                width: 256,
                height: 256,
                depth: 1,
            },
            format: KilnFormat::R8G8B8A8Unorm,
            resource_type: KilnResourceType::RENDER_TARGET_COLOR,
            ..Default::default()
        })
        .unwrap();
    let mut framebuffer = KilnFrameBuffer::new();
    framebuffer.set_color_buffer(0, &backbuffer);
    framebuffer.finalize(&device_context).unwrap();

    let mut resources =
        KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();
    resources.set_cbv(0, &uniforms).unwrap();
    resources.set_texture_srv(1, 0, &albedo).unwrap();

    let null = device_context.null_device_context().unwrap();
    let mut context = device_context.create_graphics_context().unwrap();
    context.begin().unwrap();
    context.set_root_signature(&root_signature).unwrap();

    // Both pending writes land in one batch
    context.set_resources(&mut resources).unwrap();
    assert_eq!(null.descriptor_batch_count(), 1);
    assert_eq!(null.last_batch_write_count(), 2);

    // Rebinding with nothing dirty flushes nothing
    context.set_resources(&mut resources).unwrap();
    assert_eq!(null.descriptor_batch_count(), 1);

    let clear_values = KilnClearValues {
        colors: vec![KilnColorClearValue([0.0, 0.0, 0.0, 1.0])],
        depth_stencil: None,
    };
    context.begin_render_pass(&framebuffer, &clear_values).unwrap();
    context.set_pipeline_state(&pso).unwrap();
    context.set_viewport_and_scissor(0, 0, 256, 256).unwrap();
    context.draw(3, 0).unwrap();
    context.end_render_pass().unwrap();

    // Swapping one binding dirties one slot, the next flush writes only that slot
    let other_uniforms = device_context
        .create_buffer(&KilnBufferDef::for_uniform_buffer_size(256))
        .unwrap();
    resources.set_cbv(0, &other_uniforms).unwrap();
    context.set_resources(&mut resources).unwrap();
    assert_eq!(null.descriptor_batch_count(), 2);
    assert_eq!(null.last_batch_write_count(), 1);
    assert_eq!(null.descriptor_write_count(), 3);

    context
        .transition_texture(&backbuffer, KilnResourceState::PRESENT, true)
        .unwrap();
    context.present(&backbuffer).unwrap();
    context.end().unwrap();
}

#[test]
#[should_panic(expected = "created against a different root signature")]
fn resource_sets_enforce_their_signature() {
    let device_context = KilnDeviceContext::new_null();

    let mut signature_def = KilnRootSignatureDef::new(1, 0);
    signature_def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);
    let bound_signature = device_context
        .create_root_signature(&signature_def, "bound", KilnRootSignatureFlags::NONE)
        .unwrap();
    let other_signature = device_context
        .create_root_signature(&signature_def, "other", KilnRootSignatureFlags::NONE)
        .unwrap();

    let mut resources =
        KilnResourceSet::new_for_signature(&device_context, &other_signature).unwrap();

    let mut context = device_context.create_graphics_context().unwrap();
    context.begin().unwrap();
    context.set_root_signature(&bound_signature).unwrap();
    let _ = context.set_resources(&mut resources);
}
